//! Least-connections reverse-proxy load balancer.
//!
//! Distributes incoming HTTP requests across a fixed pool of backends,
//! always picking the healthy backend with the fewest in-flight connections,
//! while per-backend probe tasks keep health state current.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │               LOAD BALANCER                    │
//!                    │                                                │
//!   Client Request   │  ┌────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ dispatch │──▶│  balancer   │  │
//!                    │  │ server │   │ handler  │   │ pool + heap │  │
//!                    │  └────────┘   └──────────┘   └──────┬──────┘  │
//!                    │                                     │         │
//!                    │                        acquire (atomic select │
//!                    │                            + increment)       │
//!                    │                                     ▼         │
//!   Client Response  │  ┌──────────┐              ┌─────────────┐    │      Backend
//!   ◀────────────────┼──│ response │◀─────────────│  forwarding │◀───┼───── Server
//!                    │  │  stream  │  guard drop  │   engine    │    │
//!                    │  └──────────┘  (decrement) └─────────────┘    │
//!                    │                                                │
//!                    │  ┌──────────────────────────────────────────┐  │
//!                    │  │  health monitor (one probe task per      │  │
//!                    │  │  backend) → pool.set_health → re-rank    │  │
//!                    │  └──────────────────────────────────────────┘  │
//!                    └───────────────────────────────────────────────┘
//! ```
//!
//! The selection structure is an indexed binary min-heap ordered by
//! `(unhealthy, conn_count, insertion id)` behind a single mutex: the root
//! is always the least-loaded healthy backend, falling back to the
//! least-loaded backend overall when nothing is healthy.

// Core subsystems
pub mod balancer;
pub mod config;
pub mod http;

// Traffic management
pub mod health;

// Cross-cutting concerns
pub mod lifecycle;

pub use balancer::{BackendPool, ConnGuard};
pub use config::BalancerConfig;
pub use health::HealthMonitor;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
