// handlers/mpesa_handlers.rs
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::error;

use crate::errors::{AppError, Result};
use crate::models::payment::StkPushInput;
use crate::state::AppState;

// C2B Handlers
pub async fn initiate_stk_push(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StkPushInput>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(input) =
        payload.map_err(|e| AppError::invalid_data(format!("Invalid JSON body: {}", e.body_text())))?;

    let request = input.into_payment_request()?;

    match state.mpesa_service.initiate_payment(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(error = %e, "Failed to initiate STK push");
            Err(e)
        }
    }
}
