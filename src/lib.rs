use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access-control core.
pub mod guard;
pub mod navigation;
pub mod role;
pub mod session;

// Login/logout flow and its remote collaborator.
pub mod auth;
pub mod auth_api;

// HTTP shell, configuration and shared types.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

use auth::CurrentPrincipal;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use auth::AuthFlow;
pub use auth_api::{AuthApiState, HttpAuthApi, MockAuthApi};
pub use config::AppConfig;
pub use guard::{AccessGuard, GuardState};
pub use navigation::NavigationRegistry;
pub use role::Role;
pub use session::{SessionState, SessionStore};

/// ApiDoc
///
/// OpenAPI document for the shell, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::logout, handlers::get_session,
        handlers::get_navigation, handlers::check_access, handlers::check_capability,
        handlers::get_access_matrix
    ),
    components(
        schemas(
            models::Credentials, models::Identity, models::SessionView,
            models::NavigationEntry, models::AccessDecision, models::AccessResponse,
            models::Capability, models::RoleAccess, models::RouteAccess,
        )
    ),
    tags(
        (name = "admin-dashboard", description = "Dashboard session and access API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request may need, shared by all requests. The session store is the
/// only mutable part, and only `AuthFlow` writes to it.
#[derive(Clone)]
pub struct AppState {
    /// The single Session/Role Store of this process.
    pub session: SessionState,
    /// Access decisions over the navigation registry.
    pub guard: GuardState,
    /// Login/logout flow, bound to the same `session`.
    pub auth: AuthFlow,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires the store, guard and flow together so the flow writes to the very store
    /// the handlers read.
    pub fn new(config: AppConfig, registry: NavigationRegistry, api: AuthApiState) -> Self {
        let session = SessionState::new(SessionStore::new());
        let auth = AuthFlow::new(session.clone(), api);
        Self {
            session,
            guard: GuardState::new(AccessGuard::new(registry)),
            auth,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.session.clone()
    }
}

impl FromRef<AppState> for GuardState {
    fn from_ref(app_state: &AppState) -> GuardState {
        app_state.guard.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_middleware
///
/// Rejects requests without a live session (401) before they reach a handler, by
/// running the `CurrentPrincipal` extractor.
async fn session_middleware(
    _principal: CurrentPrincipal,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, the session middleware and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes answer for anonymous callers too: an empty session is a valid
        // state that resolves to "denied", not an error.
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                session_middleware,
            )),
        )
        // `/admin` sits behind the session check as well, so an anonymous caller gets
        // 401 and only a signed-in non-super role reaches the handler's 403.
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                session_middleware,
            )),
        )
        .with_state(state);

    // Request ids are set before tracing so each span carries one, and copied onto the
    // response so the dashboard can quote it when reporting a failed login.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, tagged with its `x-request-id` so every log line of
/// the request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
