use crate::domain::notification::Channel;
use anyhow::Result;

pub mod mock;
pub mod twilio;

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub message_id: String,
}

#[async_trait::async_trait]
pub trait MessageSender: Send + Sync {
    fn name(&self) -> &'static str;

    /// `to` is an E.164 number; adapters add any channel-specific addressing.
    async fn send(&self, to: &str, body: &str, channel: Channel) -> Result<SentMessage>;
}

/// Normalizes a user-entered phone to E.164. Numbers without a `+` are read
/// as national numbers of `country_code` (digits only, e.g. "91").
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
    let trimmed = raw.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if has_plus {
        return (8..=15).contains(&digits.len()).then(|| format!("+{}", digits));
    }
    match digits.len() {
        10 => Some(format!("+{}{}", country_code, digits)),
        11 if digits.starts_with('0') => Some(format!("+{}{}", country_code, &digits[1..])),
        n if n == country_code.len() + 10 && digits.starts_with(country_code) => {
            Some(format!("+{}", digits))
        }
        _ => None,
    }
}

/// Log-safe form of a phone number.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
