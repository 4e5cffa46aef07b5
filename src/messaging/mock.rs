use crate::domain::notification::Channel;
use crate::messaging::{MessageSender, SentMessage};
use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMessage {
    pub to: String,
    pub body: String,
    pub channel: Channel,
    pub delivered: bool,
}

/// Records every send. Channels listed in `failing` reject their messages.
#[derive(Clone, Default)]
pub struct MockSender {
    failing: Arc<Mutex<HashSet<Channel>>>,
    sent: Arc<Mutex<Vec<RecordedMessage>>>,
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(channels: &[Channel]) -> Self {
        let sender = Self::default();
        if let Ok(mut failing) = sender.failing.lock() {
            failing.extend(channels.iter().copied());
        }
        sender
    }

    pub fn messages(&self) -> Vec<RecordedMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl MessageSender for MockSender {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, to: &str, body: &str, channel: Channel) -> Result<SentMessage> {
        let fails = self
            .failing
            .lock()
            .map(|f| f.contains(&channel))
            .unwrap_or(false);

        self.sent
            .lock()
            .map_err(|_| anyhow!("mock sender state poisoned"))?
            .push(RecordedMessage {
                to: to.to_string(),
                body: body.to_string(),
                channel,
                delivered: !fails,
            });

        if fails {
            return Err(anyhow!("mock {} channel unavailable", channel));
        }
        tracing::info!("mock {} message to {} ({} chars)", channel, super::mask_phone(to), body.len());
        Ok(SentMessage {
            message_id: format!("SM{}", uuid::Uuid::new_v4().simple()),
        })
    }
}
