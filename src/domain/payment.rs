use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customer metadata carried on a gateway order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderNotes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
}

impl OrderNotes {
    /// Blank values become `None`, the rest are trimmed and capped at `max_len` chars.
    pub fn normalized(self, max_len: usize) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().chars().take(max_len).collect::<String>())
                .filter(|s| !s.is_empty())
        };
        Self {
            email: clean(self.email),
            phone: clean(self.phone),
            first_name: clean(self.first_name),
            last_name: clean(self.last_name),
            company_name: clean(self.company_name),
            gst_number: clean(self.gst_number),
            description: clean(self.description),
            paid_for: clean(self.paid_for),
            utm_source: clean(self.utm_source),
            utm_medium: clean(self.utm_medium),
            utm_campaign: clean(self.utm_campaign),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub order_id: String,
    pub amount: f64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub gst_number: Option<String>,
    pub description: Option<String>,
    pub paid_for: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            "Member".to_string()
        } else {
            name
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: f64,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: OrderNotes,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

/// Failure body shared by every payment endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}
