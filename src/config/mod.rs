//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file (optional)
//!     → loader.rs (read + parse + validate)
//!     → CLI flag overrides applied in main
//!     → validation.rs (semantic checks, all errors collected)
//!     → immutable BalancerConfig for the process lifetime
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendConfig, BalancerConfig, ForwardingConfig, HealthCheckConfig, ListenerConfig,
};
pub use validation::{validate_config, ValidationError};
