//! Integration tests: dispatch, forwarding, health gating, tracing header.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use least_lb::config::{BackendConfig, BalancerConfig};
use least_lb::health::HealthMonitor;
use least_lb::http::HttpServer;
use least_lb::lifecycle::Shutdown;
use least_lb::BackendPool;

mod common;

fn config_for(backends: &[SocketAddr]) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.backends = backends
        .iter()
        .map(|addr| BackendConfig {
            address: addr.to_string(),
        })
        .collect();
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    config
}

/// Spin up the balancer on an ephemeral port: initial health sweep, probe
/// tasks, server. The returned `Shutdown` must be kept alive for the
/// duration of the test.
async fn start_balancer(config: BalancerConfig) -> (SocketAddr, Arc<BackendPool>, Shutdown) {
    let pool = Arc::new(BackendPool::new(
        config.backends.iter().map(|b| b.address.clone()),
    ));

    let monitor = HealthMonitor::new(
        Arc::clone(&pool),
        config.health_check.clone(),
        &config.forwarding,
    );
    monitor.probe_all().await;

    let shutdown = Shutdown::new();
    monitor.spawn_all(&shutdown);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config, Arc::clone(&pool));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, pool, shutdown)
}

#[tokio::test]
async fn forwards_to_backend_with_trace_header() {
    let backend = common::start_mock_backend("hello from backend").await;
    let config = config_for(&[backend]);
    let (addr, _pool, _shutdown) = start_balancer(config).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/api/v1/some-data"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("lb-from").unwrap(),
        &backend.to_string()
    );
    assert_eq!(response.text().await.unwrap(), "hello from backend");
}

#[tokio::test]
async fn trace_disabled_omits_backend_header() {
    let backend = common::start_mock_backend("ok").await;
    let mut config = config_for(&[backend]);
    config.forwarding.trace_enabled = false;
    let (addr, _pool, _shutdown) = start_balancer(config).await;

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().get("lb-from").is_none());
}

#[tokio::test]
async fn timeout_returns_503_and_restores_count() {
    let backend = common::start_slow_backend(Duration::from_secs(5)).await;
    let mut config = config_for(&[backend]);
    config.forwarding.timeout_secs = 1;
    let (addr, pool, _shutdown) = start_balancer(config).await;

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(response.status(), 503);

    // the guard dropped on the failure path: net accounting change is zero
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(pool.conn_count(0), 0);
}

#[tokio::test]
async fn empty_pool_fails_fast() {
    let config = config_for(&[]);
    let (addr, _pool, _shutdown) = start_balancer(config).await;

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn unhealthy_backend_is_excluded() {
    let live = common::start_mock_backend("live").await;
    let dead = common::dead_backend_addr().await;
    let config = config_for(&[dead, live]);
    let (addr, pool, _shutdown) = start_balancer(config).await;

    assert!(!pool.is_healthy(0), "dead backend should fail its probe");
    assert!(pool.is_healthy(1), "live backend should pass its probe");

    let client = reqwest::Client::new();
    for _ in 0..10 {
        let response = client.get(format!("http://{addr}/")).send().await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("lb-from").unwrap(),
            &live.to_string()
        );
    }
}

#[tokio::test]
async fn concurrent_load_spreads_across_healthy_backends() {
    // slow backends keep connections in flight, so concurrent dispatches
    // must see each other's increments and alternate
    let b1 = common::start_slow_backend(Duration::from_millis(300)).await;
    let b2 = common::start_slow_backend(Duration::from_millis(300)).await;
    let config = config_for(&[b1, b2]);
    let (addr, _pool, _shutdown) = start_balancer(config).await;

    let client = reqwest::Client::new();
    let mut requests = Vec::new();
    for _ in 0..10 {
        let client = client.clone();
        let url = format!("http://{addr}/");
        requests.push(tokio::spawn(async move {
            let response = client.get(&url).send().await.unwrap();
            assert_eq!(response.status(), 200);
            response
                .headers()
                .get("lb-from")
                .and_then(|v| v.to_str().ok())
                .unwrap()
                .to_string()
        }));
    }

    let mut hits = [0usize; 2];
    for request in requests {
        let from = request.await.unwrap();
        if from == b1.to_string() {
            hits[0] += 1;
        } else if from == b2.to_string() {
            hits[1] += 1;
        } else {
            panic!("unexpected lb-from value: {from}");
        }
    }

    assert!(hits[0] > 0, "backend 1 never selected: {hits:?}");
    assert!(hits[1] > 0, "backend 2 never selected: {hits:?}");
}

#[tokio::test]
async fn net_accounting_is_zero_after_traffic() {
    let backend = common::start_mock_backend("ok").await;
    let config = config_for(&[backend]);
    let (addr, pool, _shutdown) = start_balancer(config).await;

    let client = reqwest::Client::new();
    let mut requests = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let url = format!("http://{addr}/");
        requests.push(tokio::spawn(async move {
            let response = client.get(&url).send().await.unwrap();
            response.text().await.unwrap()
        }));
    }
    for request in requests {
        assert_eq!(request.await.unwrap(), "ok");
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(pool.conn_count(0), 0);
}
