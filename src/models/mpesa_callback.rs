// models/mpesa_callback.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct CallbackItem {
    pub name: String,
    pub value: Value,
}

impl CallbackItem {
    /// Entries without a string `Name` carry nothing addressable and are dropped.
    fn from_value(entry: &Value) -> Option<Self> {
        let name = entry.get("Name")?.as_str()?.to_string();
        let value = entry.get("Value").cloned().unwrap_or(Value::Null);
        Some(CallbackItem { name, value })
    }
}

/// `CallbackMetadata.Item` is normally an array but a lone object is accepted too.
fn metadata_items(stk_callback: &Value) -> Vec<CallbackItem> {
    match stk_callback.get("CallbackMetadata").and_then(|metadata| metadata.get("Item")) {
        Some(Value::Array(entries)) => entries.iter().filter_map(CallbackItem::from_value).collect(),
        Some(entry @ Value::Object(_)) => CallbackItem::from_value(entry).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn field_text(stk_callback: &Value, name: &str) -> Option<String> {
    match stk_callback.get(name)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Succeeded,
    Failed(i64),
    Unknown,
}

impl PaymentStatus {
    /// `0` is success, any other integer is a failure. Numeric strings are
    /// accepted; anything else is unknown.
    pub fn from_result_code(code: Option<&Value>) -> Self {
        let code = match code {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        match code {
            Some(0) => PaymentStatus::Succeeded,
            Some(code) => PaymentStatus::Failed(code),
            None => PaymentStatus::Unknown,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded)
    }
}

/// Flattened view of a single `Body.stkCallback`.
#[derive(Debug, Clone)]
pub struct CallbackResult {
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<String>,
    pub status: PaymentStatus,
    pub result_desc: Option<String>,
    pub items: Vec<CallbackItem>,
}

impl CallbackResult {
    /// Reads each field of `Body.stkCallback` on its own; a malformed field is
    /// treated as absent and never hides the `ResultCode`.
    pub fn from_stk_callback(stk_callback: &Value) -> Self {
        CallbackResult {
            merchant_request_id: field_text(stk_callback, "MerchantRequestID"),
            checkout_request_id: field_text(stk_callback, "CheckoutRequestID"),
            status: PaymentStatus::from_result_code(stk_callback.get("ResultCode")),
            result_desc: field_text(stk_callback, "ResultDesc"),
            items: metadata_items(stk_callback),
        }
    }

    pub fn item(&self, name: &str) -> Option<&Value> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.value)
    }

    pub fn confirmation(&self) -> PaymentConfirmation {
        let text = |name: &str| match self.item(name) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        PaymentConfirmation {
            amount: text("Amount"),
            receipt_number: text("MpesaReceiptNumber"),
            transaction_date: text("TransactionDate"),
            phone_number: text("PhoneNumber"),
        }
    }
}

/// Metadata the provider attaches to a successful payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentConfirmation {
    pub amount: Option<String>,
    pub receipt_number: Option<String>,
    pub transaction_date: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl Acknowledgement {
    pub fn received(message: impl Into<String>) -> Self {
        Acknowledgement {
            success: true,
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
