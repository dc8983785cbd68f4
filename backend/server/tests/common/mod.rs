#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use careers::{
    BoxFuture, app,
    application::ApplicationRecord,
    config::Config,
    database::{ConnectionStatus, RecordStore, StoreError},
    mail::{MailError, Mailer},
    state::AppState,
};
use http_body_util::BodyExt;
use lettre::Address;
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tower::ServiceExt;

pub const FRONTEND: &str = "https://careers.example.com";

pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: "redis://127.0.0.1:6379".to_string(),
        admin_email: "admin@example.com".to_string(),
        admin_email_password: "secret".to_string(),
        smtp_host: "smtp.example.com".to_string(),
        smtp_port: 465,
        frontend_origins: vec![FRONTEND.to_string()],
    }
}

/// In-memory store that runs the same schema check as the Redis store.
#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<Vec<ApplicationRecord>>,
    pub offline: AtomicBool,
}

impl MemoryStore {
    pub fn offline() -> Self {
        let store = Self::default();
        store.offline.store(true, Ordering::SeqCst);
        store
    }

    pub fn records(&self) -> Vec<ApplicationRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl RecordStore for MemoryStore {
    fn insert<'a>(
        &'a self,
        record: &'a ApplicationRecord,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            record.validate().map_err(StoreError::Validation)?;

            if self.offline.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable(redis::RedisError::from(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))));
            }

            self.records.lock().unwrap().push(record.clone());
            Ok::<(), StoreError>(())
        })
    }

    fn status(&self) -> BoxFuture<'_, ConnectionStatus> {
        Box::pin(async move {
            if self.offline.load(Ordering::SeqCst) {
                ConnectionStatus::Disconnected
            } else {
                ConnectionStatus::Connected
            }
        })
    }
}

pub struct RecordingMailer {
    sent: UnboundedSender<ApplicationRecord>,
}

impl RecordingMailer {
    pub fn new() -> (Self, UnboundedReceiver<ApplicationRecord>) {
        let (sent, received) = unbounded_channel();
        (Self { sent }, received)
    }
}

impl Mailer for RecordingMailer {
    fn send_application<'a>(
        &'a self,
        record: &'a ApplicationRecord,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let _ = self.sent.send(record.clone());
            Ok(())
        })
    }
}

/// Simulates an SMTP transport that always throws.
pub struct FailingMailer;

impl Mailer for FailingMailer {
    fn send_application<'a>(
        &'a self,
        _record: &'a ApplicationRecord,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let err = "not-an-address".parse::<Address>().unwrap_err();
            Err(MailError::Address(err))
        })
    }
}

pub fn test_app(store: Arc<dyn RecordStore>, mailer: Arc<dyn Mailer>) -> Router {
    app(AppState::with_clients(test_config(), store, mailer))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

pub async fn post_application(app: Router, body: &Value) -> (StatusCode, Value) {
    let request = Request::post("/api/submit-application")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(app, request).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}
