//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     probe_all (synchronous sweep)
//!     → initial health known before any traffic is dispatched
//!
//! Steady state (active.rs, one task per backend):
//!     Periodic timer
//!     → GET {scheme}://{backend}{path} with bounded timeout
//!     → pool.set_health (re-ranks the backend in the selection heap)
//! ```
//!
//! # Design Decisions
//! - A probe is healthy iff the call completes with a success status; any
//!   transport error, timeout, or non-success status marks unhealthy
//! - Probe failures are logged and absorbed; the loop always continues
//! - Tasks exit cleanly on the shutdown broadcast

pub mod active;

pub use active::HealthMonitor;
