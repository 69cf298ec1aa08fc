// config.rs
use std::env;
use std::fmt;
use std::time::Duration;

use crate::errors::{AppError, Result};

const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

const DEFAULT_SHORT_CODE: &str = "174379";
const DEFAULT_CALLBACK_URL: &str = "https://your-ngrok-url.ngrok-free.app/api/mpesa/callback";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PORT: u16 = 5000;

const REQUIRED_VARS: [&str; 3] = [
    "MPESA_CONSUMER_KEY",
    "MPESA_CONSUMER_SECRET",
    "MPESA_PASSKEY",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpesaEnvironment {
    Sandbox,
    Production,
}

impl MpesaEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" => MpesaEnvironment::Production,
            _ => MpesaEnvironment::Sandbox,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MpesaEnvironment::Sandbox => "sandbox",
            MpesaEnvironment::Production => "production",
        }
    }
}

/// Immutable process configuration. Loaded once at startup and handed to the
/// services that need it; nothing reads the environment after this.
#[derive(Clone)]
pub struct AppConfig {
    pub mpesa_consumer_key: String,
    pub mpesa_consumer_secret: String,
    pub mpesa_passkey: String,
    pub mpesa_short_code: String,
    pub mpesa_callback_url: String,
    pub mpesa_environment: MpesaEnvironment,
    pub mpesa_base_url: Option<String>,
    pub http_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Reads the process environment. `.env` loading is left to `main`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let http_timeout = match get("MPESA_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AppError::configuration(format!(
                        "MPESA_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                if secs == 0 {
                    return Err(AppError::configuration(
                        "MPESA_HTTP_TIMEOUT_SECS must be greater than 0",
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::configuration(format!("PORT must be a number, got '{}'", raw))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(AppConfig {
            mpesa_consumer_key: get("MPESA_CONSUMER_KEY").unwrap_or_default(),
            mpesa_consumer_secret: get("MPESA_CONSUMER_SECRET").unwrap_or_default(),
            mpesa_passkey: get("MPESA_PASSKEY").unwrap_or_default(),
            mpesa_short_code: get("MPESA_BUSINESS_SHORT_CODE")
                .unwrap_or_else(|| DEFAULT_SHORT_CODE.to_string()),
            mpesa_callback_url: get("MPESA_CALLBACK_URL")
                .unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_string()),
            mpesa_environment: get("MPESA_ENVIRONMENT")
                .map(|value| MpesaEnvironment::parse(&value))
                .unwrap_or(MpesaEnvironment::Sandbox),
            mpesa_base_url: get("MPESA_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string()),
            http_timeout,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
        })
    }

    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.mpesa_base_url {
            return url;
        }
        match self.mpesa_environment {
            MpesaEnvironment::Sandbox => SANDBOX_BASE_URL,
            MpesaEnvironment::Production => PRODUCTION_BASE_URL,
        }
    }

    /// Returns `(auth_url, stk_push_url)`.
    pub fn get_mpesa_urls(&self) -> (String, String) {
        let base_url = self.base_url();
        let auth_url = format!("{}/oauth/v1/generate?grant_type=client_credentials", base_url);
        let stk_url = format!("{}/mpesa/stkpush/v1/processrequest", base_url);
        (auth_url, stk_url)
    }

    pub fn is_production(&self) -> bool {
        self.mpesa_environment == MpesaEnvironment::Production
    }

    pub fn get_config_info(&self) -> serde_json::Value {
        serde_json::json!({
            "environment": self.mpesa_environment.as_str(),
            "is_production": self.is_production(),
            "base_url": self.base_url(),
            "business_shortcode": self.mpesa_short_code,
            "callback_url": self.mpesa_callback_url,
            "consumer_key_set": !self.mpesa_consumer_key.is_empty(),
            "consumer_secret_set": !self.mpesa_consumer_secret.is_empty(),
            "passkey_set": !self.mpesa_passkey.is_empty(),
            "http_timeout_secs": self.http_timeout.as_secs(),
            "port": self.port,
            "host": self.host,
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("mpesa_consumer_key", &"<redacted>")
            .field("mpesa_consumer_secret", &"<redacted>")
            .field("mpesa_passkey", &"<redacted>")
            .field("mpesa_short_code", &self.mpesa_short_code)
            .field("mpesa_callback_url", &self.mpesa_callback_url)
            .field("mpesa_environment", &self.mpesa_environment)
            .field("mpesa_base_url", &self.mpesa_base_url)
            .field("http_timeout", &self.http_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("MPESA_CONSUMER_KEY", "key"),
            ("MPESA_CONSUMER_SECRET", "secret"),
            ("MPESA_PASSKEY", "passkey"),
        ]
    }

    #[test]
    fn loads_defaults_when_only_credentials_are_set() {
        let config = AppConfig::from_lookup(lookup_from(&required())).unwrap();

        assert_eq!(config.mpesa_short_code, "174379");
        assert_eq!(config.mpesa_callback_url, DEFAULT_CALLBACK_URL);
        assert_eq!(config.mpesa_environment, MpesaEnvironment::Sandbox);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.port, 5000);
        assert_eq!(config.base_url(), SANDBOX_BASE_URL);
    }

    #[test]
    fn each_missing_credential_is_fatal() {
        for skipped in REQUIRED_VARS {
            let pairs: Vec<_> = required()
                .into_iter()
                .filter(|(k, _)| *k != skipped)
                .collect();
            let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            match err {
                AppError::ConfigurationError(msg) => assert!(msg.contains(skipped), "{}", msg),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn reports_every_missing_credential_at_once() {
        let err = AppConfig::from_lookup(lookup_from(&[("MPESA_PASSKEY", "  ")])).unwrap_err();
        let msg = err.to_string();
        for key in REQUIRED_VARS {
            assert!(msg.contains(key), "{}", msg);
        }
    }

    #[test]
    fn production_environment_selects_live_urls() {
        let mut pairs = required();
        pairs.push(("MPESA_ENVIRONMENT", "production"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();

        let (auth_url, stk_url) = config.get_mpesa_urls();
        assert_eq!(
            auth_url,
            "https://api.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials"
        );
        assert_eq!(stk_url, "https://api.safaricom.co.ke/mpesa/stkpush/v1/processrequest");
    }

    #[test]
    fn base_url_override_wins() {
        let mut pairs = required();
        pairs.push(("MPESA_ENVIRONMENT", "production"));
        pairs.push(("MPESA_BASE_URL", "http://127.0.0.1:9999/"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn rejects_bad_numbers() {
        let mut pairs = required();
        pairs.push(("PORT", "http"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&pairs)),
            Err(AppError::ConfigurationError(_))
        ));

        let mut pairs = required();
        pairs.push(("MPESA_HTTP_TIMEOUT_SECS", "0"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&pairs)),
            Err(AppError::ConfigurationError(_))
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = AppConfig::from_lookup(lookup_from(&required())).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret\""));
        assert!(!rendered.contains("passkey\""));
        assert!(rendered.contains("<redacted>"));
    }
}
