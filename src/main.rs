use admin_dashboard::{
    AppState, HttpAuthApi, NavigationRegistry,
    auth_api::AuthApiState,
    config::{AppConfig, Env},
    create_router,
};
use std::{process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, builds the navigation registry and the Auth
/// API client, then serves the shell until the process is stopped.
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // RUST_LOG wins; otherwise debug for this crate and request-level logs for the stack.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "admin_dashboard=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Dashboard shell starting in {:?} mode", config.env);

    let registry = match config.navigation_file.as_deref() {
        Some(path) => match NavigationRegistry::load(path) {
            Ok(registry) => registry,
            Err(e) => {
                tracing::error!(path, error = %e, "FATAL: navigation file rejected");
                return ExitCode::FAILURE;
            }
        },
        None => NavigationRegistry::default(),
    };
    tracing::info!(entries = registry.len(), "navigation registry loaded");

    let api = match HttpAuthApi::new(&config.api_base_url, config.api_timeout()) {
        Ok(api) => Arc::new(api) as AuthApiState,
        Err(e) => {
            tracing::error!(error = %e, "FATAL: could not build the Auth API client");
            return ExitCode::FAILURE;
        }
    };

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, registry, api));

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %bind_addr, error = %e, "FATAL: could not bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped with an error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
