use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Whatsapp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
        }
    }

    pub fn other(&self) -> Channel {
        match self {
            Channel::Sms => Channel::Whatsapp,
            Channel::Whatsapp => Channel::Sms,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::Whatsapp),
            other => Err(format!("unknown channel: {}", other)),
        }
    }
}

/// Values substituted into outbound message templates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateData {
    pub name: String,
    pub amount: f64,
    pub paid_for: Option<String>,
    pub transaction_id: String,
}

impl TemplateData {
    pub fn is_event(&self) -> bool {
        self.paid_for
            .as_deref()
            .map(|p| p.to_lowercase().contains("event"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum AttemptOutcome {
    Success { message_id: String },
    Failure { error: String },
}

/// One outbound message attempt. Logged, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationAttempt {
    pub channel: Channel,
    pub recipient: String,
    pub template: TemplateData,
    pub outcome: AttemptOutcome,
}
