use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::{database::StoreError, mail::MailError};

pub const GENERIC_FAILURE: &str = "Failed to submit application. Please try again later.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Field {0} must be a string")]
    InvalidField(String),

    #[error("Field {0} was submitted both at the top level and in searchFilters")]
    DuplicateField(String),

    #[error("{0}")]
    Validation(String),

    #[error("Route not found")]
    NotFound,

    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => AppError::Validation(message),
            other => AppError::InternalError(Box::new(other)),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. }
            | AppError::MissingFields { .. }
            | AppError::InvalidField { .. }
            | AppError::DuplicateField { .. }
            | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AppError::InternalError(err) => {
                error!("Request failed: {err}");
                GENERIC_FAILURE.to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} is required but not set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failures that stop the process before it starts serving.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to connect to the record store: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Failed to build the mailer: {0}")]
    Mailer(#[from] MailError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
