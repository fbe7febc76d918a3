//! Shared backend pool.
//!
//! # Responsibilities
//! - Own the selection heap behind a single mutex
//! - Select-and-increment as one atomic step (acquire)
//! - Apply health flips from the monitor
//! - Provide connection guards for in-flight accounting
//!
//! # Design Decisions
//! - One exclusive lock for every structure touch; the critical sections are
//!   an O(log n) sift at most and never span an await point
//! - `acquire` returns an RAII guard so the decrement runs exactly once per
//!   dispatch, on success, forward error, or mid-stream abort alike

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::Arc;

use crate::balancer::backend::BackendId;
use crate::balancer::heap::ConnHeap;

/// Fixed pool of backends sharing one selection heap.
#[derive(Debug)]
pub struct BackendPool {
    inner: Mutex<ConnHeap>,
}

impl BackendPool {
    /// Build the pool from backend names, in insertion order.
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            inner: Mutex::new(ConnHeap::new(names)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnHeap> {
        // Heap mutations cannot panic mid-sift, so a poisoned lock still
        // holds a consistent structure.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The backend `acquire` would currently pick, without incrementing.
    pub fn peek_best(&self) -> Option<BackendId> {
        self.lock().peek_best()
    }

    /// Select the best-ranked backend and increment its connection count in
    /// one critical section. `None` only for an empty pool.
    pub fn acquire(self: &Arc<Self>) -> Option<ConnGuard> {
        let mut heap = self.lock();
        let id = heap.peek_best()?;
        heap.update(id, |b| b.conn_count += 1);
        let name = heap.get(id).name().to_string();
        drop(heap);

        Some(ConnGuard {
            pool: Arc::clone(self),
            id,
            name,
        })
    }

    /// Record a probe result and re-rank the backend.
    pub fn set_health(&self, id: BackendId, healthy: bool) {
        let mut heap = self.lock();
        let was = heap.get(id).is_healthy();
        heap.update(id, |b| b.healthy = healthy);
        if was != healthy {
            tracing::info!(
                backend = %heap.get(id).name(),
                healthy,
                "backend health changed"
            );
        }
    }

    pub fn is_healthy(&self, id: BackendId) -> bool {
        self.lock().get(id).is_healthy()
    }

    pub fn conn_count(&self, id: BackendId) -> usize {
        self.lock().get(id).conn_count()
    }

    /// Backend names in insertion order (index == id).
    pub fn backend_names(&self) -> Vec<String> {
        self.lock()
            .backends()
            .iter()
            .map(|b| b.name().to_string())
            .collect()
    }

    fn release(&self, id: BackendId) {
        let mut heap = self.lock();
        heap.update(id, |b| b.conn_count = b.conn_count.saturating_sub(1));
    }
}

/// RAII guard for one in-flight forwarded request.
///
/// Created by [`BackendPool::acquire`] with the increment already applied;
/// dropping it decrements the backend's connection count and re-ranks it.
#[derive(Debug)]
pub struct ConnGuard {
    pool: Arc<BackendPool>,
    id: BackendId,
    name: String,
}

impl ConnGuard {
    pub fn id(&self) -> BackendId {
        self.id
    }

    /// Identity of the selected backend (`host:port`).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ConnGuard {
    fn drop(&mut self) {
        self.pool.release(self.id);
    }
}
