use crate::gateways::{GatewayOrder, GatewayOrderRequest, GatewayPayment, PaymentGateway};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-process gateway. `behavior` of `ALWAYS_FAILURE` makes every call fail.
#[derive(Clone, Default)]
pub struct MockGateway {
    pub behavior: String,
    orders: Arc<Mutex<HashMap<String, GatewayOrder>>>,
    payments: Arc<Mutex<HashMap<String, GatewayPayment>>>,
    fetch_calls: Arc<Mutex<Vec<String>>>,
}

impl MockGateway {
    pub fn new(behavior: &str) -> Self {
        Self {
            behavior: behavior.to_string(),
            ..Self::default()
        }
    }

    pub fn insert_order(&self, order: GatewayOrder) {
        if let Ok(mut orders) = self.orders.lock() {
            orders.insert(order.id.clone(), order);
        }
    }

    pub fn insert_payment(&self, payment: GatewayPayment) {
        if let Ok(mut payments) = self.payments.lock() {
            payments.insert(payment.id.clone(), payment);
        }
    }

    /// Ids passed to `fetch_order`/`fetch_payment`, in call order.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn check_behavior(&self, what: &str) -> Result<()> {
        if self.behavior == "ALWAYS_FAILURE" {
            return Err(anyhow!("mock gateway {} declined", what));
        }
        Ok(())
    }

    fn record(&self, id: &str) {
        if let Ok(mut calls) = self.fetch_calls.lock() {
            calls.push(id.to_string());
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder> {
        self.check_behavior("order creation")?;
        let order = GatewayOrder {
            id: format!("order_mock_{}", uuid::Uuid::new_v4().simple()),
            amount: request.amount_minor,
            currency: request.currency,
            receipt: Some(request.receipt),
            status: Some("created".to_string()),
            notes: request.notes,
        };
        self.insert_order(order.clone());
        Ok(order)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment> {
        self.record(payment_id);
        self.check_behavior("payment fetch")?;
        self.payments
            .lock()
            .map_err(|_| anyhow!("mock gateway state poisoned"))?
            .get(payment_id)
            .cloned()
            .ok_or_else(|| anyhow!("payment {} not found", payment_id))
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder> {
        self.record(order_id);
        self.check_behavior("order fetch")?;
        self.orders
            .lock()
            .map_err(|_| anyhow!("mock gateway state poisoned"))?
            .get(order_id)
            .cloned()
            .ok_or_else(|| anyhow!("order {} not found", order_id))
    }
}
