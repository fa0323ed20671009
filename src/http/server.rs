//! HTTP server setup for the users API.
//!
//! # Responsibilities
//! - Build the axum router with the explicit route table
//! - Inject the store and replicator into handlers via state
//! - Wire up middleware (tracing, CORS)
//! - Serve on the worker's private listener

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cluster::worker::Replicator;
use crate::http::handlers;
use crate::users::UserStore;

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub replicator: Replicator,
}

/// The users API server, hosted by one worker (or by standalone mode).
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    pub fn new(store: Arc<UserStore>, replicator: Replicator) -> Self {
        let state = AppState { store, replicator };

        // The original accepted the collection path with and without the
        // trailing slash, so both spellings stay routable.
        let users = get(handlers::list_users).post(handlers::create_user);
        let user_by_id = get(handlers::get_user)
            .put(handlers::update_user)
            .delete(handlers::delete_user);

        let router = Router::new()
            .route("/api/users", users.clone())
            .route("/api/users/", users)
            .route("/api/users/{id}", user_by_id)
            .fallback(handlers::unmatched_route)
            .method_not_allowed_fallback(handlers::method_not_supported)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any));

        Self { router }
    }

    /// The router itself, for serving without a dedicated listener (tests).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until the listener fails or the process shuts down.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "users API listening");
        axum::serve(listener, self.router).await
    }
}
