use admin_dashboard::{
    Role,
    models::{AccessDecision, Capability, Credentials, Identity, LoginGrant, Session, SessionView},
};
use serde_json::json;

#[test]
fn test_access_decision_wire_form() {
    assert_eq!(serde_json::to_value(AccessDecision::Allowed).unwrap(), json!("allowed"));
    assert_eq!(serde_json::to_value(AccessDecision::Denied).unwrap(), json!("denied"));
    assert_eq!(AccessDecision::from(true), AccessDecision::Allowed);
}

#[test]
fn test_capability_wire_form() {
    let parsed: Capability = serde_json::from_value(json!("manageMockTests")).unwrap();
    assert_eq!(parsed, Capability::ManageMockTests);
    assert_eq!(parsed.route(), "/mock-tests");
}

#[test]
fn test_login_grant_accepts_missing_expiry() {
    let grant: LoginGrant = serde_json::from_value(json!({
        "role": "duolingoAdmin",
        "identity": { "id": "42", "name": "Dee", "email": "dee@example.com" }
    }))
    .unwrap();

    assert_eq!(grant.role, "duolingoAdmin");
    assert!(grant.expires_at.is_none());
}

#[test]
fn test_session_view_of_empty_session() {
    let view = SessionView::from(&Session::default());
    let value = serde_json::to_value(&view).unwrap();

    assert_eq!(
        value,
        json!({
            "authenticated": false,
            "role": null,
            "identity": null,
            "logging": false,
            "expiresAt": null
        })
    );
}

#[test]
fn test_session_view_keeps_unrecognized_role_string() {
    let view = SessionView {
        authenticated: true,
        role: Some(Role::Unrecognized("toeflAdmin".to_string())),
        identity: Some(Identity::default()),
        logging: false,
        expires_at: None,
    };

    let value = serde_json::to_value(&view).unwrap();
    assert_eq!(value["role"], json!("toeflAdmin"));
}

#[test]
fn test_credentials_debug_redacts_password() {
    let credentials = Credentials {
        email: "admin@example.com".to_string(),
        password: "hunter2".to_string(),
    };

    let rendered = format!("{:?}", credentials);
    assert!(rendered.contains("admin@example.com"));
    assert!(!rendered.contains("hunter2"));
}
