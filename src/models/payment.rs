// models/payment.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::errors::{AppError, Result};

pub const MISSING_FIELDS_MESSAGE: &str = "Missing phoneNumber or amount";
pub const INVALID_PHONE_MESSAGE: &str = "Invalid phone number format. Use 254XXXXXXXXX.";
pub const INVALID_AMOUNT_MESSAGE: &str = "Amount must be a positive whole number";

pub const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
pub const ACCOUNT_REFERENCE: &str = "SmartShop";
pub const TRANSACTION_DESC: &str = "Payment for order";

pub static PHONE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^254[0-9]{9}$").expect("phone number pattern compiles"));

/// Raw `POST /stkpush` body. Both fields are kept loose so that a missing,
/// mistyped or empty value becomes a 400 with a readable message instead of
/// an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StkPushInput {
    pub phone_number: Option<Value>,
    pub amount: Option<Value>,
}

impl StkPushInput {
    pub fn into_payment_request(self) -> Result<PaymentRequest> {
        let phone_number = self
            .phone_number
            .as_ref()
            .and_then(value_text)
            .filter(|phone| !phone.is_empty());
        let amount = self.amount.filter(|amount| !is_blank_amount(amount));

        let (Some(phone_number), Some(amount)) = (phone_number, amount) else {
            return Err(AppError::invalid_data(MISSING_FIELDS_MESSAGE));
        };

        let amount =
            parse_amount(&amount).ok_or_else(|| AppError::invalid_data(INVALID_AMOUNT_MESSAGE))?;

        Ok(PaymentRequest {
            phone_number,
            amount,
        })
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn is_blank_amount(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Whole numbers only, either as a JSON number or a numeric string.
fn parse_amount(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct PaymentRequest {
    #[validate(regex(path = *PHONE_NUMBER_RE))]
    pub phone_number: String,

    #[validate(range(min = 1))]
    pub amount: i64,
}

impl PaymentRequest {
    pub fn new(phone_number: impl Into<String>, amount: i64) -> Self {
        PaymentRequest {
            phone_number: phone_number.into(),
            amount,
        }
    }

    /// Phone format is reported before amount problems.
    pub fn ensure_valid(&self) -> Result<()> {
        self.validate().map_err(|errors| {
            let message = if has_field_error(&errors, "phone_number") {
                INVALID_PHONE_MESSAGE
            } else {
                INVALID_AMOUNT_MESSAGE
            };
            AppError::invalid_data(message)
        })
    }
}

fn has_field_error(errors: &ValidationErrors, field: &str) -> bool {
    errors
        .field_errors()
        .get(field)
        .is_some_and(|field_errors| !field_errors.is_empty())
}

/// Signed STK push body sent to `/mpesa/stkpush/v1/processrequest`.
#[derive(Debug, Clone, Serialize)]
pub struct InitiationEnvelope {
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "TransactionType")]
    pub transaction_type: String,
    #[serde(rename = "Amount")]
    pub amount: i64,
    #[serde(rename = "PartyA")]
    pub party_a: String,
    #[serde(rename = "PartyB")]
    pub party_b: String,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
    #[serde(rename = "TransactionDesc")]
    pub transaction_desc: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<String>,
}
