//! Indexed binary min-heap over the backend pool.
//!
//! # Responsibilities
//! - Keep all backend records ordered by `(unhealthy, conn_count, id)`
//! - Restore the heap property in O(log n) after an in-place update
//! - Answer "best candidate" queries in O(1)
//!
//! # Design Decisions
//! - The heap never inserts or removes after construction; the pool is fixed
//!   for the process lifetime and every operation is update-in-place
//! - Each record carries its own slot index (`pos`), fixed up on every swap,
//!   so an update can start sifting from the record's current position
//! - Health is part of the ordering key rather than a filter: the root is the
//!   least-loaded healthy backend whenever one exists, and the least-loaded
//!   backend overall otherwise

use crate::balancer::backend::{Backend, BackendId};

/// The selection structure: backend records plus a heap-ordered permutation
/// of their ids.
///
/// Not internally synchronized; [`crate::balancer::BackendPool`] wraps it in
/// a mutex so updates never interleave and peeks never observe a half-sifted
/// order.
#[derive(Debug)]
pub struct ConnHeap {
    backends: Vec<Backend>,
    /// `order[slot]` is the id stored at that heap slot;
    /// `backends[id].pos` is the inverse mapping.
    order: Vec<BackendId>,
}

impl ConnHeap {
    /// Build the heap from backend names, in insertion order.
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let backends: Vec<Backend> = names
            .into_iter()
            .enumerate()
            .map(|(id, name)| Backend::new(name, id))
            .collect();
        let order = (0..backends.len()).collect();
        let mut heap = Self { backends, order };
        heap.rebuild();
        heap
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// The best-ranked backend: minimum `(unhealthy, conn_count, id)`.
    /// `None` only for an empty pool.
    pub fn peek_best(&self) -> Option<BackendId> {
        self.order.first().copied()
    }

    pub fn get(&self, id: BackendId) -> &Backend {
        &self.backends[id]
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    /// Apply a mutation to one record, then restore the heap property by
    /// sifting from the record's current slot.
    pub fn update<F>(&mut self, id: BackendId, apply: F)
    where
        F: FnOnce(&mut Backend),
    {
        apply(&mut self.backends[id]);
        let slot = self.backends[id].pos;
        let slot = self.sift_up(slot);
        self.sift_down(slot);
    }

    fn rebuild(&mut self) {
        for slot in (0..self.order.len() / 2).rev() {
            self.sift_down(slot);
        }
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.backends[self.order[a]].rank() < self.backends[self.order[b]].rank()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.order.swap(a, b);
        self.backends[self.order[a]].pos = a;
        self.backends[self.order[b]].pos = b;
    }

    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let mut child = 2 * slot + 1;
            if child >= self.order.len() {
                break;
            }
            if child + 1 < self.order.len() && self.less(child + 1, child) {
                child += 1;
            }
            if !self.less(child, slot) {
                break;
            }
            self.swap(slot, child);
            slot = child;
        }
    }
}
