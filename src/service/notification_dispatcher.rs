use crate::domain::notification::{AttemptOutcome, Channel, ContactInfo, NotificationAttempt, TemplateData};
use crate::messaging::{mask_phone, normalize_phone, MessageSender};
use crate::service::templates::{composite_message, confirmation_message};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub channel_used: Channel,
    pub message_id: String,
    pub fallback_used: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("no recipient phone")]
    NoRecipient,
    #[error("primary {primary_channel} failed ({primary_error}); fallback {fallback_channel} failed ({fallback_error})")]
    AllChannelsFailed {
        primary_channel: Channel,
        primary_error: String,
        fallback_channel: Channel,
        fallback_error: String,
    },
}

/// Flat view of a dispatch result for logs and API payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchSummary {
    pub success: bool,
    pub channel_used: Option<Channel>,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl From<&Result<Delivery, DispatchError>> for DispatchSummary {
    fn from(result: &Result<Delivery, DispatchError>) -> Self {
        match result {
            Ok(d) => DispatchSummary {
                success: true,
                channel_used: Some(d.channel_used),
                message_id: Some(d.message_id.clone()),
                error: None,
            },
            Err(e) => DispatchSummary {
                success: false,
                channel_used: None,
                message_id: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    pub sender: Arc<dyn MessageSender>,
    pub contact: ContactInfo,
    /// Digits prefixed to national numbers, e.g. "91".
    pub default_country_code: String,
}

impl NotificationDispatcher {
    /// Sends the composite message on `preferred`; on failure sends the short
    /// confirmation exactly once on the other channel. Never panics and never
    /// retries beyond that single fallback. A present phone that does not
    /// normalize is still attempted as entered, so the provider decides.
    pub async fn dispatch(
        &self,
        phone: Option<&str>,
        data: &TemplateData,
        preferred: Channel,
    ) -> Result<Delivery, DispatchError> {
        let Some(raw) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
            tracing::info!(
                transaction_id = %data.transaction_id,
                "notification skipped: no phone"
            );
            return Err(DispatchError::NoRecipient);
        };
        let to = match normalize_phone(raw, &self.default_country_code) {
            Some(to) => to,
            None => {
                tracing::warn!(
                    transaction_id = %data.transaction_id,
                    recipient = %mask_phone(raw),
                    "phone does not normalize to E.164; sending as entered"
                );
                raw.to_string()
            }
        };

        let primary_body = composite_message(data, &self.contact);
        let primary_error = match self.attempt(&to, &primary_body, preferred, data).await {
            Ok(message_id) => {
                return Ok(Delivery {
                    channel_used: preferred,
                    message_id,
                    fallback_used: false,
                })
            }
            Err(e) => e,
        };

        let fallback = preferred.other();
        let fallback_body = confirmation_message(data);
        match self.attempt(&to, &fallback_body, fallback, data).await {
            Ok(message_id) => Ok(Delivery {
                channel_used: fallback,
                message_id,
                fallback_used: true,
            }),
            Err(fallback_error) => Err(DispatchError::AllChannelsFailed {
                primary_channel: preferred,
                primary_error,
                fallback_channel: fallback,
                fallback_error,
            }),
        }
    }

    async fn attempt(
        &self,
        to: &str,
        body: &str,
        channel: Channel,
        data: &TemplateData,
    ) -> Result<String, String> {
        let result = self.sender.send(to, body, channel).await;
        let outcome = match &result {
            Ok(sent) => AttemptOutcome::Success {
                message_id: sent.message_id.clone(),
            },
            Err(e) => AttemptOutcome::Failure {
                error: format!("{:#}", e),
            },
        };
        let attempt = NotificationAttempt {
            channel,
            recipient: mask_phone(to),
            template: data.clone(),
            outcome,
        };

        match &attempt.outcome {
            AttemptOutcome::Success { message_id } => {
                tracing::info!(
                    channel = %attempt.channel,
                    recipient = %attempt.recipient,
                    transaction_id = %attempt.template.transaction_id,
                    "notification sent, id {}",
                    message_id
                );
                Ok(message_id.clone())
            }
            AttemptOutcome::Failure { error } => {
                tracing::warn!(
                    channel = %attempt.channel,
                    recipient = %attempt.recipient,
                    transaction_id = %attempt.template.transaction_id,
                    "notification failed: {}",
                    error
                );
                Err(error.clone())
            }
        }
    }
}
