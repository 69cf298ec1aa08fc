// services/mpesa_service.rs
use base64::{engine::general_purpose::STANDARD as base64, Engine as _};
use chrono::{DateTime, Local, TimeZone};
use reqwest::{header, Client};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::payment::{
    AuthResponse, InitiationEnvelope, PaymentRequest, ACCOUNT_REFERENCE, TRANSACTION_DESC,
    TRANSACTION_TYPE,
};

/// Formats a moment as `YYYYMMDDHHMMSS` in the given zone's wall-clock time.
pub fn format_timestamp<Tz>(moment: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    moment.format("%Y%m%d%H%M%S").to_string()
}

pub fn generate_timestamp() -> String {
    format_timestamp(&Local::now())
}

#[derive(Debug, Clone)]
pub struct MpesaService {
    config: Arc<AppConfig>,
    client: Client,
}

impl MpesaService {
    pub fn new(config: Arc<AppConfig>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(MpesaService { config, client })
    }

    pub fn generate_password(&self, timestamp: &str) -> String {
        let password_string = format!(
            "{}{}{}",
            self.config.mpesa_short_code, self.config.mpesa_passkey, timestamp
        );
        base64.encode(password_string)
    }

    /// The same `timestamp` is signed into `Password` and sent as `Timestamp`;
    /// the provider rejects the envelope if they disagree.
    pub fn build_envelope(&self, request: &PaymentRequest, timestamp: &str) -> InitiationEnvelope {
        InitiationEnvelope {
            business_short_code: self.config.mpesa_short_code.clone(),
            password: self.generate_password(timestamp),
            timestamp: timestamp.to_string(),
            transaction_type: TRANSACTION_TYPE.to_string(),
            amount: request.amount,
            party_a: request.phone_number.clone(),
            party_b: self.config.mpesa_short_code.clone(),
            phone_number: request.phone_number.clone(),
            callback_url: self.config.mpesa_callback_url.clone(),
            account_reference: ACCOUNT_REFERENCE.to_string(),
            transaction_desc: TRANSACTION_DESC.to_string(),
        }
    }

    /// Fetches a fresh OAuth token. Tokens are not cached; every initiation
    /// asks for its own.
    pub async fn acquire_access_token(&self) -> Result<String> {
        info!("Requesting new access token");
        let auth_string = format!(
            "{}:{}",
            self.config.mpesa_consumer_key, self.config.mpesa_consumer_secret
        );
        let encoded_auth = base64.encode(auth_string);

        let (auth_url, _) = self.config.get_mpesa_urls();

        let response = self
            .client
            .get(&auth_url)
            .header(header::AUTHORIZATION, format!("Basic {}", encoded_auth))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Failed to get access token");
            return Err(AppError::auth(format!("token endpoint returned {}", status)));
        }

        let auth_response: AuthResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AppError::from(e)
            } else {
                AppError::auth(format!("token response had no access_token: {}", e))
            }
        })?;

        debug!(expires_in = ?auth_response.expires_in, "Access token obtained");
        Ok(auth_response.access_token)
    }

    /// C2B STK push. Returns the provider's acknowledgement untouched; the
    /// final payment result arrives later on the callback URL.
    pub async fn initiate_payment(&self, request: &PaymentRequest) -> Result<Value> {
        request.ensure_valid()?;

        debug!(
            phone = %request.phone_number,
            amount = request.amount,
            "C2B: STK push requested"
        );

        let access_token = self.acquire_access_token().await?;
        let timestamp = generate_timestamp();
        let envelope = self.build_envelope(request, &timestamp);

        debug!(
            short_code = %envelope.business_short_code,
            timestamp = %envelope.timestamp,
            "STK push envelope prepared"
        );

        let (_, stk_url) = self.config.get_mpesa_urls();

        let response = self
            .client
            .post(&stk_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));

        if !status.is_success() {
            error!(%status, details = %payload, "M-Pesa STK Push failed");
            return Err(AppError::GatewayError {
                status: status.as_u16(),
                details: payload,
            });
        }

        let merchant_request_id = payload.get("MerchantRequestID").and_then(Value::as_str);
        let checkout_request_id = payload.get("CheckoutRequestID").and_then(Value::as_str);
        info!(merchant_request_id, checkout_request_id, "C2B initiated");
        Ok(payload)
    }
}
