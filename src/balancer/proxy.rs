//! The public-facing balancer server.
//!
//! # Responsibilities
//! - Accept inbound connections on the public port
//! - Forward each request (method, path, headers, body) to the next worker
//! - Relay the worker's response verbatim (status and body)
//! - Surface forwarding failures as 500 — no retry, no failover

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::uri::Scheme;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::balancer::pool::WorkerPool;
use crate::http::response::ApiError;

/// State shared by every proxied request.
#[derive(Clone)]
pub struct BalancerState {
    pub pool: Arc<WorkerPool>,
    pub client: Client<HttpConnector, Body>,
}

/// Public entry point of the cluster: round-robins every inbound request
/// across the worker fleet.
pub struct BalancerServer {
    router: Router,
}

impl BalancerServer {
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let state = BalancerState { pool, client };

        let router = Router::new()
            .route("/", any(forward))
            .route("/{*path}", any(forward))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        Self { router }
    }

    /// Serve until shutdown is signalled (Ctrl+C).
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "balancer listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("balancer stopped");
        Ok(())
    }
}

/// Forward one request to the next worker and relay its response.
async fn forward(State(state): State<BalancerState>, request: Request<Body>) -> Response {
    let Some(worker) = state.pool.next() else {
        tracing::error!("no workers to forward to");
        return ApiError::Internal.into_response();
    };

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        worker = worker.index,
        "forwarding request"
    );

    // Readdress the request at the worker's private port; everything else
    // (method, headers, body) passes through untouched.
    let (mut parts, body) = request.into_parts();
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(worker.authority.clone());
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(error) => {
            tracing::error!(worker = worker.index, error = %error, "failed to build worker uri");
            return ApiError::Internal.into_response();
        }
    };

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let status = response.status();
            let (parts, body) = response.into_parts();

            // A 204 carries no body; finalize it without waiting for one.
            if status == StatusCode::NO_CONTENT {
                return Response::from_parts(parts, Body::empty());
            }
            Response::from_parts(parts, Body::new(body))
        }
        Err(error) => {
            tracing::error!(worker = worker.index, error = %error, "worker request failed");
            ApiError::Internal.into_response()
        }
    }
}

/// Wait for the shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to install Ctrl+C handler");
    }
    tracing::info!("shutdown signal received");
}
