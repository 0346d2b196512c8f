use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::role::Role;

// --- Session State (Owned by the SessionStore) ---

/// Identity
///
/// The authenticated principal as described by the Auth API. Opaque to the access
/// logic: only the role is ever inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Principal
///
/// Role and identity travel together: a session either has both or neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub role: Role,
    pub identity: Identity,
    /// When the Auth API said the session stops being valid, if it said so.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// RequestTicket
///
/// Identifies one in-flight login or logout, or the login that installed a principal.
/// Only the newest ticket may complete a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(Uuid);

impl RequestTicket {
    pub(crate) fn issue() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Session
///
/// The value broadcast by the SessionStore to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub principal: Option<Principal>,
    /// The login/logout call currently outstanding, if any.
    pub in_flight: Option<RequestTicket>,
    /// Marks the installation of the current principal. A new one is issued every time
    /// a principal is installed, even for the same identity.
    pub established_by: Option<RequestTicket>,
}

impl Session {
    pub fn role(&self) -> Option<&Role> {
        self.principal.as_ref().map(|p| &p.role)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.principal.as_ref().map(|p| &p.identity)
    }

    /// The "authenticating in progress" flag.
    pub fn is_logging(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.principal.is_none() && self.in_flight.is_none()
    }
}

// --- Navigation & Access ---

/// NavigationEntry
///
/// One destination in the dashboard's side menu. `icon` is a symbol name handed
/// straight to the UI icon set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationEntry {
    pub title: String,
    pub route: String,
    pub icon: String,
}

impl NavigationEntry {
    pub fn new(title: &str, route: &str, icon: &str) -> Self {
        Self {
            title: title.to_string(),
            route: route.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// AccessDecision
///
/// Outcome of asking whether a role may reach a route. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AccessDecision {
    Allowed,
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        self == AccessDecision::Allowed
    }
}

impl From<bool> for AccessDecision {
    fn from(allowed: bool) -> Self {
        if allowed {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        }
    }
}

/// Capability
///
/// A protected UI branch (action buttons, forms) that the rendering layer gates.
/// Each capability lives on one dashboard route and inherits that route's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Capability {
    ViewDashboard,
    ManageStudents,
    ViewAttendance,
    ManageAdmins,
    ManagePayments,
    ManageRemarks,
    ManageMockTests,
    SendEmail,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::ViewDashboard,
        Capability::ManageStudents,
        Capability::ViewAttendance,
        Capability::ManageAdmins,
        Capability::ManagePayments,
        Capability::ManageRemarks,
        Capability::ManageMockTests,
        Capability::SendEmail,
    ];

    /// The dashboard route hosting this capability.
    pub fn route(self) -> &'static str {
        match self {
            Capability::ViewDashboard => "/dashboard",
            Capability::ManageStudents => "/students",
            Capability::ViewAttendance => "/attendance",
            Capability::ManageAdmins => "/admins",
            Capability::ManagePayments => "/payments",
            Capability::ManageRemarks => "/remarks",
            Capability::ManageMockTests => "/mock-tests",
            Capability::SendEmail => "/email",
        }
    }
}

// --- Auth API Payloads ---

/// Credentials
///
/// Login form payload. The password is forwarded to the Auth API and never logged.
#[derive(Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Credentials {
    #[schema(example = "admin@example.com")]
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// LoginGrant
///
/// Successful login answer from the Auth API. The role stays a raw string here so an
/// empty role surfaces as `InvalidSession` rather than as a decoding failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginGrant {
    pub role: String,
    pub identity: Identity,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

// --- Shell Responses (Output) ---

/// SessionView
///
/// What the rendering layer sees of the current session (GET /session).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionView {
    pub authenticated: bool,
    #[ts(type = "string | null")]
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
    pub identity: Option<Identity>,
    pub logging: bool,
    #[ts(type = "string | null")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            authenticated: session.principal.is_some(),
            role: session.role().cloned(),
            identity: session.identity().cloned(),
            logging: session.is_logging(),
            expires_at: session.principal.as_ref().and_then(|p| p.expires_at),
        }
    }
}

/// AccessResponse
///
/// Decision for one route or capability, echoed with the role it was computed for.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct AccessResponse {
    pub route: String,
    #[ts(type = "string | null")]
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
    pub decision: AccessDecision,
}

/// RouteAccess
///
/// A single cell of the access matrix.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct RouteAccess {
    pub route: String,
    pub decision: AccessDecision,
}

/// RoleAccess
///
/// One row of the access matrix: every registered route, decided for one role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct RoleAccess {
    #[ts(type = "string")]
    #[schema(value_type = String)]
    pub role: Role,
    pub routes: Vec<RouteAccess>,
}
