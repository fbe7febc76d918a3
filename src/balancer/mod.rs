//! Backend selection subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch:
//!     pool.rs (acquire: lock → peek root → increment → guard)
//!     → forwarding engine holds the guard for the request lifetime
//!     → guard drop (release: lock → decrement → re-sift)
//!
//! Health update:
//!     health monitor probe result
//!     → pool.rs (set_health: lock → flip flag → re-sift)
//!
//! Ordering (heap.rs):
//!     (unhealthy, conn_count, insertion id) ascending
//!     → root is the least-loaded healthy backend,
//!       or the least-loaded overall when none are healthy
//! ```
//!
//! # Design Decisions
//! - One mutex guards the whole structure; selection and increment happen
//!   under the same lock hold so concurrent dispatches never pile onto a
//!   stale minimum
//! - Records are fixed at startup; every heap operation is update-in-place
//! - Connection accounting is RAII: the guard decrements exactly once, on
//!   every exit path including client disconnect

pub mod backend;
pub mod heap;
pub mod pool;

pub use backend::{Backend, BackendId};
pub use heap::ConnHeap;
pub use pool::{BackendPool, ConnGuard};
