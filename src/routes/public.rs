use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints the rendering layer calls on every render or session change. None of
/// them require a session: without one, navigation is empty and every decision is
/// `denied`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check.
        .route("/health", get(|| async { "ok" }))
        // POST /session/login
        // Runs the login flow; the store is updated only if this call is still the newest.
        .route("/session/login", post(handlers::login))
        // GET /session
        // Role, identity and the `logging` flag of the current session.
        .route("/session", get(handlers::get_session))
        // GET /navigation
        // Menu entries the current role may open, in menu order.
        .route("/navigation", get(handlers::get_navigation))
        // GET /access?route=/students
        // Route-level decision for the current role.
        .route("/access", get(handlers::check_access))
        // GET /access/capabilities/{capability}
        // Gate for protected UI branches (forms, admin-only buttons).
        .route(
            "/access/capabilities/{capability}",
            get(handlers::check_capability),
        )
}
