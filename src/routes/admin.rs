use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Routes for the `superAdmin` role. Authentication is enforced by the session
/// middleware; the role check happens inside each handler.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/access-matrix
        // Every known role against every registered route. Makes the current policy
        // (non-super roles reach every route) visible to the people who own it.
        .route("/access-matrix", get(handlers::get_access_matrix))
}
