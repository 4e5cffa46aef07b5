#![allow(dead_code)]

use anyhow::{anyhow, Result};
use bizcivitas_payments::config::AppConfig;
use bizcivitas_payments::domain::notification::{Channel, ContactInfo};
use bizcivitas_payments::domain::payment::{OrderNotes, PaymentRecord, VerifyPaymentRequest};
use bizcivitas_payments::gateways::mock::MockGateway;
use bizcivitas_payments::gateways::{GatewayOrder, GatewayPayment};
use bizcivitas_payments::messaging::mock::MockSender;
use bizcivitas_payments::repo::payments_repo::{InsertOutcome, PaymentStore};
use bizcivitas_payments::service::notification_dispatcher::NotificationDispatcher;
use bizcivitas_payments::service::payment_service::PaymentService;
use bizcivitas_payments::service::ttl_cache::{ManualClock, TtlCache};
use bizcivitas_payments::signature;
use bizcivitas_payments::AppState;
use chrono::TimeZone;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const KEY_SECRET: &str = "rzp_test_secret_value";

/// Store keyed on payment_id, like the unique constraint in Postgres.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub rows: Arc<Mutex<Vec<PaymentRecord>>>,
    pub claimed: Arc<Mutex<HashSet<String>>>,
    pub fail: bool,
    /// Holds the insert call open this long after the row is committed.
    pub commit_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn slow(commit_delay: Duration) -> Self {
        Self {
            commit_delay: Some(commit_delay),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<PaymentRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PaymentStore for MemoryStore {
    async fn insert(&self, record: &PaymentRecord) -> Result<InsertOutcome> {
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.payment_id == record.payment_id) {
                return Ok(InsertOutcome::Duplicate);
            }
            rows.push(record.clone());
        }
        if let Some(delay) = self.commit_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(InsertOutcome::Inserted)
    }

    async fn claim_notification(&self, payment_id: &str) -> Result<bool> {
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.claimed.lock().unwrap().insert(payment_id.to_string()))
    }

    async fn ping(&self) -> Result<()> {
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }
}

pub fn contact() -> ContactInfo {
    ContactInfo {
        email: "info@bizcivitas.com".to_string(),
        phone: "+91 81606 79917".to_string(),
    }
}

pub fn service(gateway: &MockGateway, sender: &MockSender, store: &MemoryStore) -> PaymentService {
    PaymentService {
        gateway: Arc::new(gateway.clone()),
        store: Arc::new(store.clone()),
        dispatcher: NotificationDispatcher {
            sender: Arc::new(sender.clone()),
            contact: contact(),
            default_country_code: "91".to_string(),
        },
        order_cache: TtlCache::new(Duration::from_secs(600), Arc::new(ManualClock::new())),
        key_id: "rzp_test_key".to_string(),
        key_secret: KEY_SECRET.to_string(),
        primary_channel: Channel::Whatsapp,
        store_timeout: Duration::from_secs(2),
    }
}

pub fn app_state(service: PaymentService) -> AppState {
    AppState {
        payment_service: service,
        redis_client: redis::Client::open("redis://127.0.0.1:6379/").unwrap(),
        config: AppConfig::from_env(),
    }
}

/// Registers a captured payment and its order with the mock gateway.
pub fn seed(gateway: &MockGateway, order_id: &str, payment_id: &str, amount_minor: i64, notes: OrderNotes) {
    gateway.insert_order(GatewayOrder {
        id: order_id.to_string(),
        amount: amount_minor,
        currency: "INR".to_string(),
        receipt: Some("rcpt_1".to_string()),
        status: Some("paid".to_string()),
        notes,
    });
    gateway.insert_payment(GatewayPayment {
        id: payment_id.to_string(),
        order_id: Some(order_id.to_string()),
        amount: amount_minor,
        currency: "INR".to_string(),
        status: Some("captured".to_string()),
        method: Some("upi".to_string()),
        created_at: chrono::Utc.timestamp_opt(1_760_000_000, 0).unwrap(),
    });
}

pub fn member_notes(phone: Option<&str>, paid_for: &str) -> OrderNotes {
    OrderNotes {
        email: Some("asha@example.com".to_string()),
        phone: phone.map(ToString::to_string),
        first_name: Some("Asha".to_string()),
        last_name: Some("Rao".to_string()),
        company_name: Some("Rao Textiles".to_string()),
        paid_for: Some(paid_for.to_string()),
        utm_source: Some("instagram".to_string()),
        ..OrderNotes::default()
    }
}

pub fn signed(order_id: &str, payment_id: &str) -> VerifyPaymentRequest {
    VerifyPaymentRequest {
        razorpay_order_id: order_id.to_string(),
        razorpay_payment_id: payment_id.to_string(),
        razorpay_signature: signature::sign(order_id, payment_id, KEY_SECRET),
    }
}

pub async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
