use admin_dashboard::{
    AppState, HttpAuthApi, MockAuthApi, NavigationRegistry, Role,
    auth::CurrentPrincipal,
    auth_api::AuthApi,
    config::AppConfig,
    error::AuthApiError,
    models::{Credentials, Identity},
};
use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, request::Parts},
    routing::post,
};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;

// --- Fake Auth API (served over real HTTP) ---

/// Answers like the dashboard backend: `admin@example.com` / `secret` gets `pteAdmin`,
/// `blank@example.com` gets an empty role, everything else is rejected with 401.
async fn fake_login(Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    match (body["email"].as_str(), body["password"].as_str()) {
        (Some("admin@example.com"), Some("secret")) => Ok(Json(json!({
            "role": "pteAdmin",
            "identity": { "id": "adm-7", "name": "Priya", "email": "admin@example.com" },
            "expiresAt": "2099-01-01T00:00:00Z"
        }))),
        (Some("blank@example.com"), _) => Ok(Json(json!({
            "role": "",
            "identity": { "id": "adm-8", "name": "Blank", "email": "blank@example.com" }
        }))),
        (Some("garbled@example.com"), _) => Ok(Json(json!({ "unexpected": true }))),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn fake_logout(Json(body): Json<Value>) -> StatusCode {
    if body["id"] == "adm-7" {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn spawn_fake_auth_api() -> String {
    let router = Router::new()
        .route("/api/auth/login", post(fake_login))
        .route("/api/auth/logout", post(fake_logout));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}/api/", port)
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn identity(id: &str) -> Identity {
    Identity {
        id: id.to_string(),
        name: "Test".to_string(),
        email: format!("{id}@example.com"),
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn create_app_state() -> AppState {
    AppState::new(
        AppConfig::default(),
        NavigationRegistry::default(),
        Arc::new(MockAuthApi::granting("superAdmin")),
    )
}

// --- HttpAuthApi ---

#[tokio::test]
async fn test_http_login_success_decodes_grant() {
    let base = spawn_fake_auth_api().await;
    let api = HttpAuthApi::new(&base, Duration::from_secs(5)).unwrap();

    let grant = api
        .login(&credentials("admin@example.com", "secret"))
        .await
        .unwrap();

    assert_eq!(grant.role, "pteAdmin");
    assert_eq!(grant.identity.id, "adm-7");
    assert!(grant.expires_at.is_some());
}

#[tokio::test]
async fn test_http_login_rejected_credentials() {
    let base = spawn_fake_auth_api().await;
    let api = HttpAuthApi::new(&base, Duration::from_secs(5)).unwrap();

    let result = api.login(&credentials("admin@example.com", "wrong")).await;

    assert!(matches!(result, Err(AuthApiError::Rejected { status: 401 })));
}

#[tokio::test]
async fn test_http_login_unexpected_body_is_decode_error() {
    let base = spawn_fake_auth_api().await;
    let api = HttpAuthApi::new(&base, Duration::from_secs(5)).unwrap();

    let result = api.login(&credentials("garbled@example.com", "x")).await;

    assert!(matches!(result, Err(AuthApiError::Decode(_))));
}

#[tokio::test]
async fn test_http_unreachable_api_is_transport_error() {
    // Bind then drop a listener to get a port nobody is serving.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let api = HttpAuthApi::new(&format!("http://127.0.0.1:{port}"), Duration::from_secs(2)).unwrap();
    let result = api.login(&credentials("admin@example.com", "secret")).await;

    assert!(matches!(result, Err(AuthApiError::Transport(_))));
}

#[tokio::test]
async fn test_http_logout_status_mapping() {
    let base = spawn_fake_auth_api().await;
    let api = HttpAuthApi::new(&base, Duration::from_secs(5)).unwrap();

    assert!(api.logout(&identity("adm-7")).await.is_ok());
    assert!(matches!(
        api.logout(&identity("someone-else")).await,
        Err(AuthApiError::Rejected { status: 503 })
    ));
}

#[tokio::test]
async fn test_flow_over_http_populates_store() {
    let base = spawn_fake_auth_api().await;
    let api = HttpAuthApi::new(&base, Duration::from_secs(5)).unwrap();
    let state = AppState::new(AppConfig::default(), NavigationRegistry::default(), Arc::new(api));

    state
        .auth
        .login(&credentials("admin@example.com", "secret"))
        .await
        .unwrap();
    assert_eq!(state.session.role(), Some(Role::PteAdmin));

    state.auth.logout().await.unwrap();
    assert_eq!(state.session.role(), None);
}

#[tokio::test]
async fn test_flow_over_http_rejects_blank_role() {
    let base = spawn_fake_auth_api().await;
    let api = HttpAuthApi::new(&base, Duration::from_secs(5)).unwrap();
    let state = AppState::new(AppConfig::default(), NavigationRegistry::default(), Arc::new(api));

    let result = state.auth.login(&credentials("blank@example.com", "x")).await;

    assert!(result.is_err());
    assert_eq!(state.session.role(), None);
    assert!(!state.session.is_logging());
}

// --- CurrentPrincipal Extractor ---

#[tokio::test]
async fn test_extractor_without_session_is_unauthorized() {
    let app_state = create_app_state();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let principal = CurrentPrincipal::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(principal.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_extractor_resolves_live_session() {
    let app_state = create_app_state();
    app_state
        .session
        .set_session(Role::SatAdmin, identity("adm-1"))
        .unwrap();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let principal = CurrentPrincipal::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(principal.role, Role::SatAdmin);
    assert_eq!(principal.identity.id, "adm-1");
}

#[tokio::test]
async fn test_extractor_clears_expired_session() {
    let app_state = create_app_state();
    app_state
        .session
        .set_session_until(
            Role::SuperAdmin,
            identity("root"),
            Some(Utc::now() - ChronoDuration::seconds(1)),
        )
        .unwrap();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let principal = CurrentPrincipal::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(principal.unwrap_err(), StatusCode::UNAUTHORIZED);
    assert_eq!(app_state.session.role(), None);
}
