use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::{
    error::SessionError,
    models::{Identity, Principal, RequestTicket, Session},
    role::Role,
};

/// Completion
///
/// Result of finishing an in-flight login or logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The call's result is now the session.
    Applied,
    /// A newer call (or a `clear`) superseded the login, or a newer login replaced the
    /// principal a logout was for. The session was not touched.
    Stale,
}

/// SessionStore
///
/// Single source of truth for the authenticated principal.
///
/// Built on a `watch` channel: every mutation replaces the whole `Session` value and
/// marks it changed for all receivers before the mutating call returns. Role and
/// identity live in one `Principal`, so no receiver can ever see one without the other.
///
/// Only the login/logout flow (and session expiry) should call the mutators; every
/// other component reads through `snapshot`, `role` or `subscribe`.
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<Session>,
}

/// SessionState
///
/// Shared handle to the store, as held in the application state.
pub type SessionState = Arc<SessionStore>;

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates an empty, unauthenticated store.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx }
    }

    /// Registers a new observer. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.tx.borrow().role().cloned()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.tx.borrow().identity().cloned()
    }

    pub fn is_logging(&self) -> bool {
        self.tx.borrow().is_logging()
    }

    /// set_session
    ///
    /// Installs `role` and `identity` together, with no expiry.
    ///
    /// A hand-built `Role::Unrecognized` holding a known role string is stored as that
    /// known role.
    ///
    /// # Errors
    /// `SessionError::InvalidSession` when the role is empty. The store is left exactly
    /// as it was and no subscriber is notified.
    pub fn set_session(&self, role: Role, identity: Identity) -> Result<(), SessionError> {
        self.set_session_until(role, identity, None)
    }

    /// Same as `set_session`, recording when the session stops being valid.
    pub fn set_session_until(
        &self,
        role: Role,
        identity: Identity,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), SessionError> {
        let role = role.normalized()?;

        tracing::info!(role = %role, principal = %identity.id, "session established");
        self.tx.send_modify(|session| {
            session.principal = Some(Principal {
                role,
                identity,
                expires_at,
            });
            session.established_by = Some(RequestTicket::issue());
        });
        Ok(())
    }

    /// clear
    ///
    /// Drops the principal and any in-flight ticket. Clearing an empty store changes
    /// nothing and notifies nobody.
    pub fn clear(&self) {
        let changed = self.tx.send_if_modified(|session| {
            if session.is_empty() {
                return false;
            }
            *session = Session::default();
            true
        });

        if changed {
            tracing::info!("session cleared");
        }
    }

    /// begin_request
    ///
    /// Marks a session-mutating call as outstanding. The returned ticket supersedes any
    /// earlier one, so an older call finishing late can no longer write.
    pub fn begin_request(&self) -> RequestTicket {
        let ticket = RequestTicket::issue();
        self.tx.send_modify(|session| {
            if let Some(previous) = session.in_flight.replace(ticket) {
                tracing::debug!(%previous, %ticket, "superseding in-flight session request");
            }
        });
        ticket
    }

    /// complete_login
    ///
    /// Applies a login result if `ticket` is still the newest request. Stale
    /// completions leave the store untouched.
    ///
    /// # Errors
    /// `SessionError::InvalidSession` for an empty role. The ticket stays in flight so
    /// the caller can `abandon` it.
    pub fn complete_login(
        &self,
        ticket: RequestTicket,
        role: Role,
        identity: Identity,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Completion, SessionError> {
        let role = role.normalized()?;

        let mut principal = Some(Principal {
            role,
            identity,
            expires_at,
        });
        let applied = self.tx.send_if_modified(|session| {
            if session.in_flight != Some(ticket) {
                return false;
            }
            session.principal = principal.take();
            session.established_by = Some(ticket);
            session.in_flight = None;
            true
        });

        if applied {
            let session = self.tx.borrow();
            if let Some(principal) = session.principal.as_ref() {
                tracing::info!(role = %principal.role, principal = %principal.identity.id, "session established");
            }
            Ok(Completion::Applied)
        } else {
            tracing::warn!(%ticket, "discarding stale login completion");
            Ok(Completion::Stale)
        }
    }

    /// complete_logout
    ///
    /// Records a logout the Auth API has accepted for the principal installed by
    /// `established_by` (the value of `Session::established_by` when the logout began).
    ///
    /// If `ticket` is still the newest request the whole session is cleared. Otherwise
    /// the principal is still dropped as long as no later login replaced it, and the
    /// newer call keeps its ticket. Only a replaced principal makes the logout `Stale`;
    /// a principal that is already gone (cleared or expired) counts as signed out.
    pub fn complete_logout(
        &self,
        ticket: RequestTicket,
        established_by: Option<RequestTicket>,
    ) -> Completion {
        let mut completion = Completion::Applied;
        let changed = self.tx.send_if_modified(|session| {
            if session.in_flight == Some(ticket) {
                *session = Session::default();
                return true;
            }
            if session.principal.is_none() {
                return false;
            }
            if session.established_by != established_by {
                completion = Completion::Stale;
                return false;
            }
            session.principal = None;
            session.established_by = None;
            true
        });

        match completion {
            Completion::Applied if changed => tracing::info!("session cleared by logout"),
            Completion::Applied => {}
            Completion::Stale => {
                tracing::warn!(%ticket, "logout finished after a newer login; session kept");
            }
        }
        completion
    }

    /// abandon
    ///
    /// Failure path for an in-flight request: drops the `logging` flag if `ticket` is
    /// current. The principal is never touched.
    pub fn abandon(&self, ticket: RequestTicket) {
        self.tx.send_if_modified(|session| {
            if session.in_flight != Some(ticket) {
                return false;
            }
            session.in_flight = None;
            true
        });
    }

    /// expire_if_stale
    ///
    /// Drops the principal when its expiry is at or before `now`. Returns whether it
    /// did. An in-flight login or logout keeps its ticket.
    pub fn expire_if_stale(&self, now: DateTime<Utc>) -> bool {
        let expired = self.tx.send_if_modified(|session| {
            let stale = session
                .principal
                .as_ref()
                .is_some_and(|principal| principal.is_expired(now));
            if stale {
                session.principal = None;
                session.established_by = None;
            }
            stale
        });

        if expired {
            tracing::info!("session expired");
        }
        expired
    }
}
