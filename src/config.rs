use std::{env, time::Duration};

/// AppConfig
///
/// Holds the shell's entire configuration. Loaded once at startup and then shared
/// read-only through the application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and fail-fast rules.
    pub env: Env,
    // Base URL of the remote dashboard API (login/logout live under `/auth`).
    pub api_base_url: String,
    // Address the HTTP shell listens on.
    pub bind_addr: String,
    // Per-request timeout for Auth API calls, in seconds.
    pub api_timeout_secs: u64,
    // Optional JSON file replacing the built-in navigation menu.
    pub navigation_file: Option<String>,
}

/// Env
///
/// Runtime context: local development or a deployed environment.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_API_TIMEOUT_SECS: u64 = 15;

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            navigation_file: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables:
    /// `APP_ENV`, `API_BASE_URL`, `BIND_ADDR`, `API_TIMEOUT_SECS`, `NAVIGATION_FILE`.
    ///
    /// # Panics
    /// In production, panics when `API_BASE_URL` is not set so the shell never starts
    /// pointed at a developer backend.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| LOCAL_API_BASE_URL.to_string())
            }
        };

        let api_timeout_secs = env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        Self {
            env,
            api_base_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            api_timeout_secs,
            navigation_file: env::var("NAVIGATION_FILE").ok().filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}
