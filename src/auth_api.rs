use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    error::AuthApiError,
    models::{Credentials, Identity, LoginGrant},
};

// 1. AuthApi Contract
/// AuthApi
///
/// The remote Auth API as seen by the login/logout flow. Implementations only talk to
/// the network; they never touch the SessionStore.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for the principal's role and identity.
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, AuthApiError>;

    /// Ends the server-side session of `identity`.
    async fn logout(&self, identity: &Identity) -> Result<(), AuthApiError>;
}

/// AuthApiState
///
/// Shared handle to the Auth API implementation, as held in the application state.
pub type AuthApiState = Arc<dyn AuthApi>;

// 2. The Real Implementation (reqwest)
/// HttpAuthApi
///
/// Talks JSON to the dashboard backend:
/// - `POST {base}/auth/login`  `{email, password}` → `{role, identity, expiresAt?}`
/// - `POST {base}/auth/logout` `{id}`
#[derive(Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Builds a client with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, AuthApiError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), email = %credentials.email, "auth api rejected login");
            return Err(AuthApiError::Rejected {
                status: status.as_u16(),
            });
        }

        response
            .json::<LoginGrant>()
            .await
            .map_err(|e| AuthApiError::Decode(e.to_string()))
    }

    async fn logout(&self, identity: &Identity) -> Result<(), AuthApiError> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .json(&serde_json::json!({ "id": identity.id }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "auth api rejected logout");
            return Err(AuthApiError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

// 3. The Mock Implementation (For Tests)
/// MockReply
///
/// One scripted answer to a login call: wait `delay`, then grant `role` or reject with
/// the given HTTP status.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub delay: Duration,
    pub outcome: Result<String, u16>,
}

impl MockReply {
    pub fn grant(role: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(role.to_string()),
        }
    }

    pub fn reject(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(status),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// MockAuthApi
///
/// In-memory stand-in for the Auth API. Scripted replies are consumed in order; once
/// the script runs out every login gets the fallback reply.
pub struct MockAuthApi {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    logout_status: Option<u16>,
    logout_delay: Duration,
    login_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

impl MockAuthApi {
    /// Grants `role` to every login.
    pub fn granting(role: &str) -> Self {
        Self::scripted(Vec::new(), MockReply::grant(role))
    }

    /// Rejects every login with `status`.
    pub fn rejecting(status: u16) -> Self {
        Self::scripted(Vec::new(), MockReply::reject(status))
    }

    pub fn scripted(replies: Vec<MockReply>, fallback: MockReply) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            fallback,
            logout_status: None,
            logout_delay: Duration::ZERO,
            login_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
        }
    }

    /// Makes every logout fail with `status`.
    pub fn with_failing_logout(mut self, status: u16) -> Self {
        self.logout_status = Some(status);
        self
    }

    /// Makes every logout wait `delay` before answering.
    pub fn with_logout_delay(mut self, delay: Duration) -> Self {
        self.logout_delay = delay;
        self
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> MockReply {
        let mut script = self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        script.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, AuthApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply();
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }

        match reply.outcome {
            Ok(role) => Ok(LoginGrant {
                role,
                identity: Identity {
                    id: format!("mock-{}", credentials.email),
                    name: "Mock Admin".to_string(),
                    email: credentials.email.clone(),
                },
                expires_at: None,
            }),
            Err(status) => Err(AuthApiError::Rejected { status }),
        }
    }

    async fn logout(&self, _identity: &Identity) -> Result<(), AuthApiError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if !self.logout_delay.is_zero() {
            tokio::time::sleep(self.logout_delay).await;
        }

        match self.logout_status {
            Some(status) => Err(AuthApiError::Rejected { status }),
            None => Ok(()),
        }
    }
}

