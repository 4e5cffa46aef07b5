use crate::domain::payment::OrderNotes;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod mock;
pub mod razorpay;

/// Razorpay caps note values at 256 characters.
pub const MAX_NOTE_LEN: usize = 256;

#[derive(Debug, Clone)]
pub struct GatewayOrderRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: OrderNotes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "notes_from_value")]
    pub notes: OrderNotes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Notes arrive as an object, or as `[]` when the order was created without
/// any. Scalar values are coerced to strings and nulls dropped.
fn notes_from_value<'de, D>(deserializer: D) -> Result<OrderNotes, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Object(map) = value else {
        return Ok(OrderNotes::default());
    };

    let coerced: serde_json::Map<String, serde_json::Value> = map
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::String(s) => Some((k, serde_json::Value::String(s))),
            serde_json::Value::Number(n) => Some((k, serde_json::Value::String(n.to_string()))),
            serde_json::Value::Bool(b) => Some((k, serde_json::Value::String(b.to_string()))),
            _ => None,
        })
        .collect();

    let notes: OrderNotes = serde_json::from_value(serde_json::Value::Object(coerced))
        .map_err(<D::Error as serde::de::Error>::custom)?;
    Ok(notes.normalized(MAX_NOTE_LEN))
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder>;

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment>;

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder>;
}
