//! Forwarding engine.
//!
//! # Responsibilities
//! - Rebuild the inbound request against the chosen backend
//! - Bound the outbound call with the configured timeout
//! - Copy status and headers back, stamp `lb-from` when tracing is enabled
//! - Stream the response body verbatim
//! - Guarantee the connection count decrement on every exit path
//!
//! # Design Decisions
//! - Failures never propagate: transport errors and timeouts become a 503,
//!   no retry, no failover to another backend
//! - The connection guard rides inside the response body stream, so the
//!   decrement happens only once the copy finishes or the client goes away
//! - A body-copy error is logged but cannot change the status already sent

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Request, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use crate::balancer::ConnGuard;
use crate::config::ForwardingConfig;

/// Response header naming the backend that served the request.
pub const LB_FROM: HeaderName = HeaderName::from_static("lb-from");

/// Forwarding knobs, fixed at startup.
#[derive(Debug, Clone)]
pub struct ForwardSettings {
    pub timeout: Duration,
    pub scheme: &'static str,
    pub trace_enabled: bool,
}

impl From<&ForwardingConfig> for ForwardSettings {
    fn from(config: &ForwardingConfig) -> Self {
        Self {
            timeout: config.timeout(),
            scheme: config.scheme(),
            trace_enabled: config.trace_enabled,
        }
    }
}

/// Relay one request to the backend held by `guard`.
///
/// Infallible from the caller's point of view: every failure is absorbed
/// into a degraded response. The guard's increment was applied by
/// `acquire`; its drop (here on the error paths, or at the end of the
/// response stream on success) performs the matching decrement.
pub async fn forward(
    client: &reqwest::Client,
    settings: &ForwardSettings,
    guard: ConnGuard,
    request: Request<Body>,
) -> Response<Body> {
    let (parts, body) = request.into_parts();

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}://{}{}", settings.scheme, guard.name(), target);

    // Host is set by the client from the target URL; everything else is
    // relayed untouched.
    let mut headers = parts.headers;
    headers.remove(header::HOST);

    let outbound = client
        .request(parts.method, url.as_str())
        .headers(headers)
        .body(reqwest::Body::wrap_stream(body.into_data_stream()))
        .timeout(settings.timeout);

    match outbound.send().await {
        Ok(upstream) => {
            let status = upstream.status();
            tracing::debug!(backend = %guard.name(), status = %status, uri = %url, "forwarded");

            let mut response = Response::builder().status(status);
            if let Some(response_headers) = response.headers_mut() {
                for (name, value) in upstream.headers() {
                    response_headers.append(name.clone(), value.clone());
                }
                if settings.trace_enabled {
                    if let Ok(value) = HeaderValue::from_str(guard.name()) {
                        response_headers.insert(LB_FROM, value);
                    }
                }
            }

            let body = Body::from_stream(GuardedStream::new(upstream.bytes_stream(), guard));
            response
                .body(body)
                .unwrap_or_else(|_| StatusCode::SERVICE_UNAVAILABLE.into_response())
        }
        Err(error) => {
            if error.is_timeout() {
                tracing::warn!(backend = %guard.name(), uri = %url, "forward timed out");
            } else {
                tracing::warn!(backend = %guard.name(), uri = %url, error = %error, "forward failed");
            }
            // guard drops here: the decrement runs even though the call failed
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

/// Response body stream that owns the connection guard.
///
/// The guard drops when the stream is exhausted or dropped (client
/// disconnect, copy error), which is exactly when the forwarded request
/// stops occupying a backend connection.
struct GuardedStream {
    inner: BoxStream<'static, reqwest::Result<Bytes>>,
    guard: ConnGuard,
}

impl GuardedStream {
    fn new<S>(inner: S, guard: ConnGuard) -> Self
    where
        S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: inner.boxed(),
            guard,
        }
    }
}

impl Stream for GuardedStream {
    type Item = reqwest::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Err(error))) => {
                // status and headers are already on the wire; log and abort
                tracing::warn!(
                    backend = %self.guard.name(),
                    error = %error,
                    "failed to copy response body"
                );
                Poll::Ready(Some(Err(error)))
            }
            other => other,
        }
    }
}
