//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (Axum setup, dispatch handler)
//!     → pool.acquire (select-and-increment, one critical section)
//!     → forward.rs (rebuild request, bounded outbound call,
//!                   stream response back, lb-from stamp)
//!     → guard drop inside the response stream (decrement)
//! ```

pub mod forward;
pub mod server;

pub use forward::{forward, ForwardSettings};
pub use server::HttpServer;
