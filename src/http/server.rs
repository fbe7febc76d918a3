//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the wildcard dispatch handler
//! - Wire up middleware (tracing, request ID)
//! - Serve on a bound listener until the shutdown broadcast fires
//! - Dispatch: select a backend and hand off to the forwarding engine

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::balancer::BackendPool;
use crate::config::BalancerConfig;
use crate::http::forward::{forward, ForwardSettings};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub client: reqwest::Client,
    pub settings: ForwardSettings,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    pool: Arc<BackendPool>,
}

impl HttpServer {
    /// Create a new HTTP server over an already-built pool.
    pub fn new(config: &BalancerConfig, pool: Arc<BackendPool>) -> Self {
        let state = AppState {
            pool: Arc::clone(&pool),
            client: reqwest::Client::new(),
            settings: ForwardSettings::from(&config.forwarding),
        };

        let router = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        Self { router, pool }
    }

    /// The shared pool (handy for tests and introspection).
    pub fn pool(&self) -> Arc<BackendPool> {
        Arc::clone(&self.pool)
    }

    /// Serve on the listener until the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Request entry point: pick the least-loaded eligible backend and relay.
///
/// Stateless per request. An empty pool fails fast with 503; selection and
/// increment happen atomically inside `acquire`.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.pool.acquire() {
        Some(guard) => forward(&state.client, &state.settings, guard, request).await,
        None => {
            tracing::warn!("no backend available");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
