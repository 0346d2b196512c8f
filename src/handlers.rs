use crate::{
    AppState,
    auth::{CurrentPrincipal, LoginOutcome},
    error::{AuthApiError, AuthError},
    models::{
        AccessResponse, Capability, Credentials, NavigationEntry, RoleAccess, SessionView,
    },
    session::{Completion, SessionState},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;

// --- Query Structs ---

/// AccessQuery
///
/// Query parameters for GET /access.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct AccessQuery {
    /// Dashboard route to check, e.g. `/students`.
    pub route: String,
}

/// Maps a flow failure to the status the rendering layer sees.
fn auth_error_status(error: &AuthError) -> StatusCode {
    match error {
        AuthError::Api(AuthApiError::Rejected { status: 401 | 403 }) => StatusCode::UNAUTHORIZED,
        AuthError::Api(_) | AuthError::Session(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Reads the store after dropping any expired session.
fn current_session(store: &SessionState) -> SessionView {
    store.expire_if_stale(Utc::now());
    SessionView::from(&store.snapshot())
}

// --- Handlers ---

/// login
///
/// [Public Route] Runs the login flow against the Auth API.
///
/// A login superseded by a newer one answers 409 with the session as it now stands.
#[utoipa::path(
    post,
    path = "/session/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in", body = SessionView),
        (status = 401, description = "Credentials rejected"),
        (status = 409, description = "Superseded by a newer request", body = SessionView),
        (status = 502, description = "Auth API failure")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<SessionView>, (StatusCode, Json<SessionView>)> {
    match state.auth.login(&credentials).await {
        Ok(LoginOutcome::SignedIn { .. }) => Ok(Json(current_session(&state.session))),
        Ok(LoginOutcome::Superseded) => Err((
            StatusCode::CONFLICT,
            Json(current_session(&state.session)),
        )),
        Err(e) => Err((auth_error_status(&e), Json(current_session(&state.session)))),
    }
}

/// logout
///
/// [Authenticated Route] Runs the logout flow. On Auth API failure the session is kept.
/// 409 means a login finished first and its session stays.
#[utoipa::path(
    post,
    path = "/session/logout",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "No session"),
        (status = 409, description = "A newer login replaced the session"),
        (status = 502, description = "Auth API failure")
    )
)]
pub async fn logout(_principal: CurrentPrincipal, State(state): State<AppState>) -> StatusCode {
    match state.auth.logout().await {
        Ok(Completion::Applied) => StatusCode::NO_CONTENT,
        Ok(Completion::Stale) => StatusCode::CONFLICT,
        Err(e) => auth_error_status(&e),
    }
}

/// get_session
///
/// [Public Route] Current session as seen by the rendering layer.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current session", body = SessionView))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(current_session(&state.session))
}

/// get_navigation
///
/// [Public Route] Menu entries the current role may open. Empty without a session.
#[utoipa::path(
    get,
    path = "/navigation",
    responses((status = 200, description = "Visible entries", body = [NavigationEntry]))
)]
pub async fn get_navigation(State(state): State<AppState>) -> Json<Vec<NavigationEntry>> {
    let session = current_session(&state.session);
    Json(state.guard.visible_entries(session.role.as_ref()))
}

/// check_access
///
/// [Public Route] Whether the current role may navigate to `route`.
/// Unknown routes are an ordinary `denied`, not an error.
#[utoipa::path(
    get,
    path = "/access",
    params(AccessQuery),
    responses((status = 200, description = "Decision", body = AccessResponse))
)]
pub async fn check_access(
    State(state): State<AppState>,
    Query(query): Query<AccessQuery>,
) -> Json<AccessResponse> {
    let session = current_session(&state.session);
    let decision = state.guard.can_access(session.role.as_ref(), &query.route);
    tracing::debug!(route = %query.route, ?decision, "route access checked");

    Json(AccessResponse {
        route: query.route,
        role: session.role,
        decision,
    })
}

/// check_capability
///
/// [Public Route] Whether the current role may render a protected UI branch.
#[utoipa::path(
    get,
    path = "/access/capabilities/{capability}",
    params(("capability" = Capability, Path, description = "Capability name, e.g. manageAdmins")),
    responses((status = 200, description = "Decision", body = AccessResponse))
)]
pub async fn check_capability(
    State(state): State<AppState>,
    Path(capability): Path<Capability>,
) -> Json<AccessResponse> {
    let session = current_session(&state.session);
    let decision = state.guard.can_use(session.role.as_ref(), capability);

    Json(AccessResponse {
        route: capability.route().to_string(),
        role: session.role,
        decision,
    })
}

/// get_access_matrix
///
/// [Admin Route] Decision of every enumerated role against every registered route.
///
/// *Authorization*: `superAdmin` only; any other role receives 403.
#[utoipa::path(
    get,
    path = "/admin/access-matrix",
    responses(
        (status = 200, description = "Access matrix", body = [RoleAccess]),
        (status = 401, description = "No session"),
        (status = 403, description = "Not a super admin")
    )
)]
pub async fn get_access_matrix(
    principal: CurrentPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleAccess>>, StatusCode> {
    if !principal.role.is_super_admin() {
        tracing::warn!(role = %principal.role, "access matrix requested by non super admin");
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(Json(state.guard.access_matrix()))
}
