// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("M-Pesa authentication failed: {0}")]
    AuthError(String),

    #[error("M-Pesa request failed: {0}")]
    TransportError(String),

    #[error("M-Pesa request timed out: {0}")]
    UpstreamTimeout(String),

    #[error("STK Push request failed with status {status}")]
    GatewayError { status: u16, details: Value },

    #[error("Callback processing error: {0}")]
    CallbackProcessingError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::AuthError(_) | AppError::TransportError(_) => {
                (StatusCode::BAD_GATEWAY, json!({ "error": self.to_string() }))
            }
            AppError::UpstreamTimeout(_) => {
                (StatusCode::GATEWAY_TIMEOUT, json!({ "error": self.to_string() }))
            }
            AppError::GatewayError { status, details } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "STK Push request failed",
                    "details": details,
                    "providerStatus": status,
                }),
            ),
            AppError::ConfigurationError(_) | AppError::CallbackProcessingError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::UpstreamTimeout(err.to_string())
        } else {
            AppError::TransportError(err.to_string())
        }
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        AppError::AuthError(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }

    pub fn callback(msg: impl Into<String>) -> Self {
        AppError::CallbackProcessingError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
