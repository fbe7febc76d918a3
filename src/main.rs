//! Load balancer entry point.
//!
//! Startup order: tracing → config (file, then CLI overrides, then
//! validation) → pool → initial health sweep → probe tasks → bind → serve.
//! Failure to bind the listening port is the only fatal runtime error.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use least_lb::config::{self, BackendConfig, BalancerConfig, ConfigError};
use least_lb::health::HealthMonitor;
use least_lb::http::HttpServer;
use least_lb::lifecycle::{wait_for_termination, Shutdown};
use least_lb::BackendPool;

#[derive(Parser)]
#[command(name = "least-lb")]
#[command(about = "Least-connections reverse-proxy load balancer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load balancer listening port.
    #[arg(long)]
    port: Option<u16>,

    /// Outbound request timeout in seconds.
    #[arg(long = "timeout-sec")]
    timeout_sec: Option<u64>,

    /// Forward to backends over HTTPS.
    #[arg(long)]
    https: bool,

    /// Whether to include the lb-from tracing header in responses.
    #[arg(long, action = clap::ArgAction::Set)]
    trace: Option<bool>,

    /// Backend address (host:port); repeatable, replaces the configured pool.
    #[arg(long = "backend")]
    backends: Vec<String>,
}

impl Cli {
    fn into_config(self) -> Result<BalancerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => BalancerConfig::default(),
        };

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(timeout) = self.timeout_sec {
            config.forwarding.timeout_secs = timeout;
        }
        if self.https {
            config.forwarding.https = true;
        }
        if let Some(trace) = self.trace {
            config.forwarding.trace_enabled = trace;
        }
        if !self.backends.is_empty() {
            config.backends = self
                .backends
                .into_iter()
                .map(|address| BackendConfig { address })
                .collect();
        }

        config::validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "least_lb=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Cli::parse().into_config()?;

    tracing::info!(
        port = config.listener.port,
        backends = config.backends.len(),
        scheme = config.forwarding.scheme(),
        trace_enabled = config.forwarding.trace_enabled,
        "starting load balancer"
    );

    let pool = Arc::new(BackendPool::new(
        config.backends.iter().map(|b| b.address.clone()),
    ));

    let shutdown = Shutdown::new();

    // probe every backend once before accepting traffic, then keep probing
    // on the configured interval
    let monitor = HealthMonitor::new(
        Arc::clone(&pool),
        config.health_check.clone(),
        &config.forwarding,
    );
    monitor.probe_all().await;
    let probe_tasks = monitor.spawn_all(&shutdown);

    let listener = TcpListener::bind(("0.0.0.0", config.listener.port)).await?;

    let server = HttpServer::new(&config, Arc::clone(&pool));
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        wait_for_termination().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    for task in probe_tasks {
        let _ = task.await;
    }

    tracing::info!("shutdown complete");
    Ok(())
}
