use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
};
use chrono::Utc;

use crate::{
    auth_api::AuthApiState,
    error::AuthError,
    models::{Credentials, Identity},
    role::Role,
    session::{Completion, SessionState},
};

/// LoginOutcome
///
/// What happened to a login whose Auth API call succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session now belongs to this principal.
    SignedIn { role: Role, identity: Identity },
    /// A later login or logout was issued while this one was in flight; its result
    /// was dropped.
    Superseded,
}

/// AuthFlow
///
/// The login/logout flow: the only writer of the SessionStore besides expiry.
///
/// Each call takes a `RequestTicket` before awaiting the Auth API and hands it back on
/// completion. If another call started in between, an older login is discarded,
/// so a slow response can never overwrite a newer session.
#[derive(Clone)]
pub struct AuthFlow {
    store: SessionState,
    api: AuthApiState,
}

impl AuthFlow {
    pub fn new(store: SessionState, api: AuthApiState) -> Self {
        Self { store, api }
    }

    pub fn store(&self) -> &SessionState {
        &self.store
    }

    /// login
    ///
    /// # Errors
    /// - `AuthError::Api` when the Auth API fails or rejects the credentials.
    /// - `AuthError::Session` when the API grants an empty role.
    ///
    /// In both cases the previous session is left exactly as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, AuthError> {
        let ticket = self.store.begin_request();
        tracing::debug!(%ticket, email = %credentials.email, "login started");

        let grant = match self.api.login(credentials).await {
            Ok(grant) => grant,
            Err(e) => {
                self.store.abandon(ticket);
                tracing::warn!(error = %e, "login failed");
                return Err(e.into());
            }
        };

        let role = match grant.role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                self.store.abandon(ticket);
                tracing::error!("auth api granted an empty role");
                return Err(e.into());
            }
        };

        let completion = self.store.complete_login(
            ticket,
            role.clone(),
            grant.identity.clone(),
            grant.expires_at,
        )?;

        Ok(match completion {
            Completion::Applied => LoginOutcome::SignedIn {
                role,
                identity: grant.identity,
            },
            Completion::Stale => LoginOutcome::Superseded,
        })
    }

    /// logout
    ///
    /// Signing out without a session is a no-op. If the Auth API fails the session
    /// is kept and the error returned.
    ///
    /// Once the Auth API accepts, the principal that was signed out is dropped even if
    /// a login started meanwhile. `Completion::Stale` means that login had already
    /// installed a new principal, which is kept.
    pub async fn logout(&self) -> Result<Completion, AuthError> {
        let session = self.store.snapshot();
        let Some(identity) = session.identity().cloned() else {
            return Ok(Completion::Applied);
        };

        let ticket = self.store.begin_request();
        if let Err(e) = self.api.logout(&identity).await {
            self.store.abandon(ticket);
            tracing::warn!(error = %e, "logout failed; session kept");
            return Err(e.into());
        }

        Ok(self.store.complete_logout(ticket, session.established_by))
    }
}

/// CurrentPrincipal Extractor Result
///
/// The signed-in principal, resolved from the SessionStore for one request.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal {
    pub role: Role,
    pub identity: Identity,
}

/// CurrentPrincipal Extractor Implementation
///
/// Expired sessions are cleared before the lookup, so an expired principal is never
/// handed to a handler.
///
/// Rejection: `StatusCode::UNAUTHORIZED` (401) when no live session exists.
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionState::from_ref(state);
        store.expire_if_stale(Utc::now());

        let session = store.snapshot();
        let principal = session.principal.ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(CurrentPrincipal {
            role: principal.role,
            identity: principal.identity,
        })
    }
}
