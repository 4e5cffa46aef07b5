use crate::gateways::{GatewayOrder, GatewayOrderRequest, GatewayPayment, PaymentGateway};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::json;

pub struct RazorpayGateway {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl RazorpayGateway {
    async fn read<T: DeserializeOwned>(&self, resp: reqwest::Response, what: &str) -> Result<T> {
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<T>()
                .await
                .with_context(|| format!("razorpay {} response did not match schema", what));
        }

        let body = resp.text().await.unwrap_or_default();
        let description = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/description")
                    .and_then(|d| d.as_str())
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| body.chars().take(200).collect());
        Err(anyhow!(
            "razorpay {} failed with HTTP_{}: {}",
            what,
            status.as_u16(),
            description
        ))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("razorpay {} timed out after {}ms", what, self.timeout_ms)
                } else {
                    anyhow!("razorpay {} network error: {}", what, e)
                }
            })?;
        self.read(resp, what).await
    }
}

#[async_trait::async_trait]
impl PaymentGateway for RazorpayGateway {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder> {
        let body = json!({
            "amount": request.amount_minor,
            "currency": request.currency,
            "receipt": request.receipt,
            "notes": request.notes,
            "payment_capture": 1
        });

        let resp = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("razorpay order creation timed out after {}ms", self.timeout_ms)
                } else {
                    anyhow!("razorpay order creation network error: {}", e)
                }
            })?;
        self.read(resp, "order creation").await
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment> {
        self.get(&format!("/v1/payments/{}", payment_id), "payment fetch")
            .await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder> {
        self.get(&format!("/v1/orders/{}", order_id), "order fetch").await
    }
}
