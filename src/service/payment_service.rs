use crate::domain::notification::Channel;
use crate::domain::payment::{CreateOrderRequest, CreateOrderResponse, PaymentRecord, VerifyPaymentRequest};
use crate::gateways::{GatewayOrder, GatewayOrderRequest, PaymentGateway, MAX_NOTE_LEN};
use crate::repo::payments_repo::{InsertOutcome, PaymentStore};
use crate::service::notification_dispatcher::{Delivery, DispatchError, DispatchSummary, NotificationDispatcher};
use crate::service::record_builder;
use crate::service::ttl_cache::TtlCache;
use crate::signature;
use anyhow::{anyhow, Context};
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Razorpay rejects orders below one rupee.
const MIN_AMOUNT_MINOR: i64 = 100;
const MAX_RECEIPT_LEN: usize = 40;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Missing required payment fields: {0}")]
    MissingFields(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("gateway lookup failed: {0:#}")]
    Gateway(anyhow::Error),
    #[error("payment store failed: {0:#}")]
    Store(anyhow::Error),
}

impl VerificationError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::Gateway(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the browser. Internal detail stays in logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingFields(_) | Self::InvalidSignature => self.to_string(),
            Self::Gateway(_) | Self::Store(_) => "Payment verification failed".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateOrderError {
    #[error("{0}")]
    Invalid(String),
    #[error("order creation failed: {0:#}")]
    Gateway(anyhow::Error),
}

impl CreateOrderError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> String {
        match self {
            Self::Invalid(msg) => msg.clone(),
            Self::Gateway(_) => "Failed to create order".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct VerificationReport {
    pub record: PaymentRecord,
    pub insert: InsertOutcome,
    /// `None` when an earlier request already handled the notification.
    pub notification: Option<Result<Delivery, DispatchError>>,
}

#[derive(Clone)]
pub struct PaymentService {
    pub gateway: Arc<dyn PaymentGateway>,
    pub store: Arc<dyn PaymentStore>,
    pub dispatcher: NotificationDispatcher,
    pub order_cache: TtlCache<String, GatewayOrder>,
    pub key_id: String,
    pub key_secret: String,
    pub primary_channel: Channel,
    pub store_timeout: Duration,
}

impl PaymentService {
    pub async fn create_order(&self, req: CreateOrderRequest) -> Result<CreateOrderResponse, CreateOrderError> {
        if !req.amount.is_finite() || req.amount <= 0.0 {
            return Err(CreateOrderError::Invalid("Amount must be a positive number".to_string()));
        }
        let amount_minor = (req.amount * 100.0).round() as i64;
        if amount_minor < MIN_AMOUNT_MINOR {
            return Err(CreateOrderError::Invalid("Amount must be at least 1.00".to_string()));
        }

        let currency = req
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("INR")
            .to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CreateOrderError::Invalid("Currency must be a 3-letter code".to_string()));
        }

        let receipt = req
            .receipt
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| r.chars().take(MAX_RECEIPT_LEN).collect::<String>())
            .unwrap_or_else(|| format!("rcpt_{}", uuid::Uuid::new_v4().simple()));

        let order = self
            .gateway
            .create_order(GatewayOrderRequest {
                amount_minor,
                currency,
                receipt,
                notes: req.notes.normalized(MAX_NOTE_LEN),
            })
            .await
            .map_err(|e| {
                tracing::error!("{} order creation failed: {:#}", self.gateway.name(), e);
                CreateOrderError::Gateway(e)
            })?;

        tracing::info!(order_id = %order.id, amount_minor = order.amount, "order created");
        self.order_cache.set(order.id.clone(), order.clone()).await;

        Ok(CreateOrderResponse {
            success: true,
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.key_id.clone(),
        })
    }

    /// verify -> fetch -> build -> store -> notify, strictly in that order.
    pub async fn verify(&self, req: VerifyPaymentRequest) -> Result<VerificationReport, VerificationError> {
        let order_id = req.razorpay_order_id.trim();
        let payment_id = req.razorpay_payment_id.trim();
        let supplied = req.razorpay_signature.trim();

        let missing: Vec<&str> = [
            ("razorpay_order_id", order_id),
            ("razorpay_payment_id", payment_id),
            ("razorpay_signature", supplied),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| k)
        .collect();
        if !missing.is_empty() {
            return Err(VerificationError::MissingFields(missing.join(", ")));
        }

        if self.key_secret.trim().is_empty() {
            return Err(self.gateway_failure(anyhow!("gateway key secret is not configured")));
        }
        if !signature::verify(order_id, payment_id, supplied, &self.key_secret) {
            tracing::warn!(order_id, payment_id, "signature mismatch");
            return Err(VerificationError::InvalidSignature);
        }

        let payment = self
            .gateway
            .fetch_payment(payment_id)
            .await
            .map_err(|e| self.gateway_failure(e))?;
        if let Some(paid_order) = payment.order_id.as_deref() {
            if paid_order != order_id {
                return Err(self.gateway_failure(anyhow!(
                    "payment {} belongs to order {}, not {}",
                    payment_id,
                    paid_order,
                    order_id
                )));
            }
        }
        let order = self
            .order(order_id)
            .await
            .map_err(|e| self.gateway_failure(e))?;

        let record = record_builder::build(&payment, &order);

        let insert = self
            .with_store_timeout("insert", self.store.insert(&record))
            .await
            .map_err(|e| {
                tracing::error!(payment_id, "payment store failed: {:#}", e);
                VerificationError::Store(e)
            })?;
        match insert {
            InsertOutcome::Inserted => {
                tracing::info!(payment_id, order_id, amount = record.amount, "payment recorded")
            }
            InsertOutcome::Duplicate => tracing::info!(payment_id, "payment already recorded"),
        }

        // An earlier request may have committed the row and then failed before
        // notifying, so a duplicate still notifies unless someone claimed it.
        let claimed = self
            .with_store_timeout("notification claim", self.store.claim_notification(payment_id))
            .await
            .map_err(|e| {
                tracing::error!(payment_id, "notification claim failed: {:#}", e);
                VerificationError::Store(e)
            })?;
        if !claimed {
            tracing::info!(payment_id, "notification already handled; skipping");
            return Ok(VerificationReport {
                record,
                insert,
                notification: None,
            });
        }

        let data = record_builder::template_data(&record);
        let notification = self
            .dispatcher
            .dispatch(record.phone.as_deref(), &data, self.primary_channel)
            .await;
        let summary = DispatchSummary::from(&notification);
        match &notification {
            Ok(delivery) if delivery.fallback_used => {
                tracing::warn!(payment_id, "notification delivered via fallback: {:?}", summary)
            }
            Ok(_) => tracing::info!(payment_id, "notification delivered: {:?}", summary),
            Err(DispatchError::NoRecipient) => {}
            Err(_) => tracing::error!(payment_id, "notification failed on all channels: {:?}", summary),
        }

        Ok(VerificationReport {
            record,
            insert,
            notification: Some(notification),
        })
    }

    async fn order(&self, order_id: &str) -> anyhow::Result<GatewayOrder> {
        let key = order_id.to_string();
        if let Some(order) = self.order_cache.get(&key).await {
            return Ok(order);
        }
        let order = self.gateway.fetch_order(order_id).await?;
        self.order_cache.set(key, order.clone()).await;
        Ok(order)
    }

    async fn with_store_timeout<T>(
        &self,
        what: &str,
        call: impl std::future::Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| anyhow!("{} timed out after {}ms", what, self.store_timeout.as_millis()))?
            .with_context(|| format!("{} failed", what))
    }

    fn gateway_failure(&self, e: anyhow::Error) -> VerificationError {
        tracing::error!("{} lookup failed: {:#}", self.gateway.name(), e);
        VerificationError::Gateway(e)
    }
}
