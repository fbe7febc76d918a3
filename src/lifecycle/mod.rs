//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main):
//!     Load config → Validate → Build pool → Initial health sweep
//!     → Spawn monitors → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast trigger → server drains,
//!     health probe tasks exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_termination;
