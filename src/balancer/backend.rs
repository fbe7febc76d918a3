//! Backend record.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track active connections (for least-connections selection)
//! - Track health state (probed by the health monitor)
//! - Remember its slot in the selection heap

/// Stable identifier of a backend within the pool.
///
/// Assigned in insertion order at startup and never reused; doubles as the
/// deterministic tie-breaker when connection counts are equal.
pub type BackendId = usize;

/// A single backend server.
///
/// Mutable fields are only ever touched through [`crate::balancer::ConnHeap`]
/// update operations, which keep `pos` consistent with the record's actual
/// slot in the heap order.
#[derive(Debug)]
pub struct Backend {
    /// Backend identity, `host:port`. Immutable; also the forward target.
    name: String,
    /// Pool id, fixed at insertion.
    id: BackendId,
    /// Last probe result. Backends start unhealthy until the initial sweep.
    pub(crate) healthy: bool,
    /// Number of in-flight forwarded requests.
    pub(crate) conn_count: usize,
    /// Current slot in the heap order. Maintained by the heap on every swap.
    pub(crate) pos: usize,
}

impl Backend {
    pub(crate) fn new(name: String, id: BackendId) -> Self {
        Self {
            name,
            id,
            healthy: false,
            conn_count: 0,
            pos: id,
        }
    }

    /// Backend identity (`host:port`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> BackendId {
        self.id
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn conn_count(&self) -> usize {
        self.conn_count
    }

    /// Heap ordering key: healthy before unhealthy, then fewest in-flight
    /// connections, then insertion order.
    pub(crate) fn rank(&self) -> (bool, usize, BackendId) {
        (!self.healthy, self.conn_count, self.id)
    }
}
