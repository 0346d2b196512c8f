use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Authenticated Router Module
///
/// Routes that only make sense with a live session. The router is wrapped in the
/// session middleware in `create_router`, and handlers also take `CurrentPrincipal`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /session/logout
        // Ends the session; an Auth API failure leaves it in place.
        .route("/session/logout", post(handlers::logout))
}
