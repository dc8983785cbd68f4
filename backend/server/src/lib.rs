//! Backend for the careers site job application form.
//!
//! # General Infrastructure
//! - Frontend posts the form as JSON to `/api/submit-application`
//! - Every valid submission is written once to Redis, then the admin inbox gets an email
//! - Email is best-effort, a stored application is a successful submission
//! - Only the configured frontend origins may call the API cross-origin
//!
//!
//!
//! # Endpoints
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | `POST` | `/api/submit-application` | `201` record, `400` validation, `500` store failure |
//! | `GET` | `/api/health` | `200` status, database connectivity, timestamp |
//! | `GET` | `/` | `200` HTML info page |
//!
//!
//!
//! # Setup
//!
//! Required environment.
//! ```sh
//! export ADMIN_EMAIL=careers@example.com
//! export ADMIN_EMAIL_PASSWORD=app-password   # or /run/secrets/ADMIN_EMAIL_PASSWORD
//! ```
//!
//! Optional, with defaults.
//! ```sh
//! export PORT=3001
//! export DATABASE_URL=redis://127.0.0.1:6379
//! export SMTP_HOST=smtp.gmail.com
//! export SMTP_PORT=465
//! export FRONTEND_URL=http://localhost:3000,https://careers.example.com
//! export RUST_LOG=info
//! ```
//!
//! Run, then send a sample application.
//! ```sh
//! cargo run -p careers-backend
//! cargo run -p tester -- --filter city=NYC
//! ```
use std::{pin::Pin, sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use tokio::{net::TcpListener, signal::ctrl_c};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod application;
pub mod config;
pub mod database;
pub mod error;
pub mod mail;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use error::StartupError;
use routes::{health_handler, landing_handler, not_found_handler, submit_application_handler};
use state::AppState;

/// Boxed future returned by the object-safe store and mailer traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub async fn start_server() -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.frontend_origins);

    Router::new()
        .route("/", get(landing_handler))
        .route("/api/health", get(health_handler))
        .route("/api/submit-application", post(submit_application_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| warn!("Ignoring invalid origin {origin}: {e}"))
                .ok()
        })
        .collect();

    if origins.is_empty() {
        warn!("No valid frontend origins configured, cross-origin requests will be refused");
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
