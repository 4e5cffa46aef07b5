use crate::domain::notification::Channel;
use crate::messaging::{MessageSender, SentMessage};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub struct TwilioSender {
    pub base_url: String,
    pub account_sid: String,
    pub auth_token: String,
    pub sms_from: String,
    pub whatsapp_from: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    code: Option<i64>,
    message: Option<String>,
}

fn address(number: &str, channel: Channel) -> String {
    match channel {
        Channel::Sms => number.to_string(),
        Channel::Whatsapp if number.starts_with("whatsapp:") => number.to_string(),
        Channel::Whatsapp => format!("whatsapp:{}", number),
    }
}

impl TwilioSender {
    fn from_number(&self, channel: Channel) -> Result<&str> {
        let from = match channel {
            Channel::Sms => self.sms_from.as_str(),
            Channel::Whatsapp => self.whatsapp_from.as_str(),
        };
        if from.is_empty() {
            return Err(anyhow!("no sender number configured for {}", channel));
        }
        Ok(from)
    }
}

#[async_trait::async_trait]
impl MessageSender for TwilioSender {
    fn name(&self) -> &'static str {
        "twilio"
    }

    async fn send(&self, to: &str, body: &str, channel: Channel) -> Result<SentMessage> {
        if self.account_sid.is_empty() || self.auth_token.is_empty() {
            return Err(anyhow!("twilio credentials are not configured"));
        }
        let from = address(self.from_number(channel)?, channel);
        let to = address(to, channel);

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let resp = self
            .client
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", body)])
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("twilio {} send timed out after {}ms", channel, self.timeout_ms)
                } else {
                    anyhow!("twilio {} send network error: {}", channel, e)
                }
            })?;

        let status = resp.status();
        if status.is_success() {
            let message: MessageResource = resp
                .json()
                .await
                .context("twilio message response did not match schema")?;
            return Ok(SentMessage {
                message_id: message.sid,
            });
        }

        let text = resp.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<TwilioError>(&text) {
            Ok(TwilioError {
                code: Some(code),
                message: Some(message),
            }) => format!("{} (code {})", message, code),
            Ok(TwilioError {
                message: Some(message),
                ..
            }) => message,
            _ => text.chars().take(200).collect(),
        };
        Err(anyhow!(
            "twilio {} send failed with HTTP_{}: {}",
            channel,
            status.as_u16(),
            detail
        ))
    }
}
