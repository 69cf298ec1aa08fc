// services/callback_service.rs
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{AppError, Result};
use crate::models::mpesa_callback::{Acknowledgement, CallbackResult, PaymentStatus};

/// Parses a raw STK callback body down to `Body.stkCallback`.
pub fn process_callback(body: &[u8]) -> Result<CallbackResult> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::callback("empty callback body"));
    }

    let callback: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::callback(format!("JSON parsing error: {}", e)))?;
    let stk_callback = callback
        .get("Body")
        .and_then(|body| body.get("stkCallback"))
        .filter(|stk_callback| stk_callback.is_object())
        .ok_or_else(|| AppError::callback("missing Body.stkCallback"))?;

    Ok(CallbackResult::from_stk_callback(stk_callback))
}

/// Logs the outcome and builds the acknowledgement sent back to the provider.
/// Nothing here is allowed to fail.
pub fn acknowledge(outcome: Result<CallbackResult>) -> Acknowledgement {
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Unprocessable M-Pesa callback acknowledged");
            return Acknowledgement::received("Callback received");
        }
    };

    let merchant_request_id = result.merchant_request_id.as_deref().unwrap_or("-");
    let checkout_request_id = result.checkout_request_id.as_deref().unwrap_or("-");
    let result_desc = result.result_desc.as_deref().unwrap_or("No description");

    match result.status {
        PaymentStatus::Succeeded => {
            let confirmation = result.confirmation();
            info!(
                merchant_request_id,
                checkout_request_id,
                receipt = confirmation.receipt_number.as_deref(),
                amount = confirmation.amount.as_deref(),
                phone = confirmation.phone_number.as_deref(),
                transaction_date = confirmation.transaction_date.as_deref(),
                "M-Pesa payment succeeded"
            );
            Acknowledgement::received("Payment completed successfully")
        }
        PaymentStatus::Failed(code) => {
            info!(
                merchant_request_id,
                checkout_request_id,
                result_code = code,
                result_desc,
                "M-Pesa payment failed"
            );
            Acknowledgement::received(format!("Payment failed: {}", result_desc))
        }
        PaymentStatus::Unknown => {
            warn!(
                merchant_request_id,
                checkout_request_id,
                "M-Pesa callback without a usable ResultCode"
            );
            Acknowledgement::received("Callback received with unknown result")
        }
    }
}
