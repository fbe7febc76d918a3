//! Active health checking.
//!
//! # Responsibilities
//! - Probe every backend once before traffic is served
//! - Run one repeating probe task per backend until shutdown
//! - Feed each result into the pool so ranking stays current

use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time;

use crate::balancer::BackendPool;
use crate::config::{ForwardingConfig, HealthCheckConfig};
use crate::lifecycle::Shutdown;

/// Periodic prober for the backend pool.
pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    config: HealthCheckConfig,
    scheme: &'static str,
    client: reqwest::Client,
}

impl HealthMonitor {
    pub fn new(
        pool: Arc<BackendPool>,
        config: HealthCheckConfig,
        forwarding: &ForwardingConfig,
    ) -> Self {
        Self {
            pool,
            config,
            scheme: forwarding.scheme(),
            client: reqwest::Client::new(),
        }
    }

    /// Probe every backend once and record the results. Called at startup so
    /// initial health is known before the first dispatch.
    pub async fn probe_all(&self) {
        for (id, name) in self.pool.backend_names().into_iter().enumerate() {
            let healthy = self.probe(&name).await;
            self.pool.set_health(id, healthy);
        }
    }

    /// Spawn one repeating probe task per backend. Each task ticks on the
    /// configured interval and exits on the shutdown broadcast.
    pub fn spawn_all(self, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        let monitor = Arc::new(self);
        monitor
            .pool
            .backend_names()
            .into_iter()
            .enumerate()
            .map(|(id, name)| {
                let monitor = Arc::clone(&monitor);
                let mut shutdown = shutdown.subscribe();
                tokio::spawn(async move {
                    // the initial sweep already ran; first tick is one full
                    // interval out
                    let period = monitor.config.interval();
                    let mut ticker = time::interval_at(time::Instant::now() + period, period);
                    loop {
                        tokio::select! {
                            _ = ticker.tick() => {
                                let healthy = monitor.probe(&name).await;
                                monitor.pool.set_health(id, healthy);
                            }
                            _ = shutdown.recv() => {
                                tracing::debug!(backend = %name, "health probe task stopping");
                                break;
                            }
                        }
                    }
                })
            })
            .collect()
    }

    async fn probe(&self, name: &str) -> bool {
        let url = format!("{}://{}{}", self.scheme, name, self.config.path);
        let started = Instant::now();
        match self
            .client
            .get(&url)
            .timeout(self.config.timeout())
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(
                    backend = %name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "health probe ok"
                );
                true
            }
            Ok(response) => {
                tracing::warn!(
                    backend = %name,
                    status = %response.status(),
                    "health probe failed: non-success status"
                );
                false
            }
            Err(error) => {
                tracing::warn!(backend = %name, error = %error, "health probe failed");
                false
            }
        }
    }
}
