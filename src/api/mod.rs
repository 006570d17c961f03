//! API module
//!
//! HTTP endpoints and middleware.

pub mod middleware;
pub mod routes;

use axum::{middleware as axum_middleware, routing::get, Router};
use sqlx::SqlitePool;
use std::time::Duration;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::TellerHandler;
use crate::ledger::Ledger;
use crate::session::{AuthManager, SessionStore};

pub use routes::create_router;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, session_ttl: Duration) -> Self {
        Self {
            ledger: Ledger::new(pool),
            sessions: SessionStore::new(session_ttl),
        }
    }

    pub fn auth(&self) -> AuthManager {
        AuthManager::new(self.ledger.clone(), self.sessions.clone())
    }

    pub fn teller(&self) -> TellerHandler {
        TellerHandler::new(self.ledger.clone(), self.sessions.clone())
    }
}

/// Build the application router with all middleware
pub fn build_router(state: AppState) -> Router {
    // Axum layers run outermost-last-added: request id -> trace -> logging -> session -> handler
    let atm_routes = create_router()
        .layer(axum_middleware::from_fn(middleware::session_middleware))
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    Router::new()
        // Health check (no session)
        .route("/health", get(health_check))
        .merge(atm_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
