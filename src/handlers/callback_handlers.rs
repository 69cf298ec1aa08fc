// handlers/callback_handlers.rs
use axum::{body::Bytes, extract::rejection::BytesRejection, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::mpesa_callback::Acknowledgement;
use crate::services::callback_service;

/// Provider-facing result notification. Always answers 200: anything else
/// makes the provider redeliver.
pub async fn mpesa_callback(body: Result<Bytes, BytesRejection>) -> Json<Acknowledgement> {
    let outcome = match body {
        Ok(bytes) => {
            info!(bytes = bytes.len(), "Received M-Pesa callback");
            callback_service::process_callback(&bytes)
        }
        Err(rejection) => {
            warn!(error = %rejection, "Could not read M-Pesa callback body");
            Err(AppError::callback(rejection.body_text()))
        }
    };

    Json(callback_service::acknowledge(outcome))
}

pub async fn callback_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "mpesa-callback",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
