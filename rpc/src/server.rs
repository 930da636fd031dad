//! Axum-based HTTP server.

use crate::error::RpcError;
use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the API router. Request bodies above `max_document_bytes` are
/// refused before they reach a handler.
pub fn router(state: AppState, max_document_bytes: usize) -> Router {
    Router::new()
        .route(
            "/proposals",
            post(handlers::propose).get(handlers::list_proposals),
        )
        .route("/proposals/:id", get(handlers::get_proposal))
        .route("/proposals/:id/vote", post(handlers::vote))
        .route("/proposals/:id/execute", post(handlers::execute))
        .route(
            "/proposals/:id/voters/:identity",
            get(handlers::has_voted),
        )
        .route("/governors", get(handlers::list_governors))
        .route("/institutions", get(handlers::list_institutions))
        .route("/roles/:identity", get(handlers::role_of))
        .route("/documents", post(handlers::upload_document))
        .route("/documents/:cid", get(handlers::resolve_document))
        .route("/documents/:cid/content", get(handlers::fetch_document))
        .route("/credentials", post(handlers::issue_credential))
        .route("/credentials/:cid", get(handlers::get_credential))
        .route(
            "/credentials/by-id/:credential_id",
            get(handlers::get_credential_by_id),
        )
        .route(
            "/students/:identity/credentials",
            get(handlers::student_credentials),
        )
        .route(
            "/institutions/:identity/credentials",
            get(handlers::institution_credentials),
        )
        .route("/verify", post(handlers::verify))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_document_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The HTTP server, bound to an address and serving shared state.
pub struct RpcServer {
    pub listen_addr: SocketAddr,
    pub max_document_bytes: usize,
    state: AppState,
}

impl RpcServer {
    pub fn new(listen_addr: SocketAddr, max_document_bytes: usize, state: AppState) -> Self {
        Self {
            listen_addr,
            max_document_bytes,
            state,
        }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state.clone(), self.max_document_bytes);
        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.listen_addr)))?;
        info!(addr = %self.listen_addr, "HTTP API listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("HTTP API stopped");
        Ok(())
    }
}
