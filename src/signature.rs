//! Razorpay checkout signature check.
//!
//! The gateway signs `order_id|payment_id` with the account key secret using
//! HMAC-SHA256 and hands the lowercase hex digest to the client, which posts it
//! back to us together with both ids.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEX_LEN: usize = 64;

fn mac_for(order_id: &str, payment_id: &str, secret: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Some(mac)
}

/// Hex signature the gateway would produce for this order/payment pair.
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
    mac_for(order_id, payment_id, secret)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Returns `true` only when `supplied_signature` is exactly the lowercase hex
/// digest for the pair. Empty inputs and malformed signatures are `false`.
pub fn verify(order_id: &str, payment_id: &str, supplied_signature: &str, secret: &str) -> bool {
    if order_id.is_empty() || payment_id.is_empty() || supplied_signature.is_empty() || secret.is_empty() {
        return false;
    }
    if supplied_signature.len() != SIGNATURE_HEX_LEN
        || !supplied_signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return false;
    }
    let Ok(supplied) = hex::decode(supplied_signature) else {
        return false;
    };
    match mac_for(order_id, payment_id, secret) {
        // verify_slice compares in constant time
        Some(mac) => mac.verify_slice(&supplied).is_ok(),
        None => false,
    }
}
