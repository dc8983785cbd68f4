use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Html,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::{
    application::ApplicationRecord,
    database::ConnectionStatus,
    error::AppError,
    mail::Mailer,
    state::AppState,
    utils::{ApplicationPayload, get_application_from_payload},
};

pub const SUBMIT_SUCCESS: &str = "Application submitted successfully";

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: ApplicationRecord,
}

#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: ConnectionStatus,
    pub timestamp: DateTime<Utc>,
}

pub async fn submit_application_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ApplicationPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

    let application = get_application_from_payload(payload)?;
    let record = ApplicationRecord::new(application);

    state.store.insert(&record).await?;
    info!("Stored application {}", record.id);

    notify_admin(state.mailer.clone(), record.clone());

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            message: SUBMIT_SUCCESS,
            data: record,
        }),
    ))
}

/// Fire-and-forget, the response never waits on SMTP.
fn notify_admin(mailer: Arc<dyn Mailer>, record: ApplicationRecord) {
    tokio::spawn(async move {
        match mailer.send_application(&record).await {
            Ok(()) => info!("Notification sent for application {}", record.id),
            Err(e) => error!("Failed to send notification for application {}: {e}", record.id),
        }
    });
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "operational",
        database: state.store.status().await,
        timestamp: Utc::now(),
    })
}

pub async fn landing_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Careers API</title>
</head>
<body>
  <h1>Careers API</h1>
  <p>Backend for the job application form.</p>
  <h2>Endpoints</h2>
  <ul>
    <li><code>POST /api/submit-application</code> submit an application</li>
    <li><code>GET /api/health</code> service and database status</li>
  </ul>
  <p>Apply through the <a href="{frontend}">application form</a>.</p>
</body>
</html>
"#,
        frontend = state.config.frontend_url(),
    ))
}

pub async fn not_found_handler() -> AppError {
    AppError::NotFound
}
