//! Razorpay integration: hosted checkout orders and payment-signature
//! verification.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::config::RazorpayConfig;
use crate::error::AppResult;

type HmacSha256 = Hmac<Sha256>;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Check that a claimed payment completion was authorized by the gateway.
///
/// The gateway signs `"{order_id}|{payment_id}"` with the shared key secret
/// (HMAC-SHA256, hex-encoded). Comparison is constant-time.
pub fn verify_payment_signature(
    key_secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let supplied = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(key_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());

    mac.verify_slice(&supplied).is_ok()
}

#[derive(Debug, Deserialize)]
struct GatewayOrder {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Debug)]
pub struct CheckoutOrder {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
}

/// Create a hosted checkout order at the gateway. `amount` is in minor units.
pub async fn create_checkout_order(
    config: &RazorpayConfig,
    amount: i64,
    currency: &str,
) -> AppResult<CheckoutOrder> {
    let client = reqwest::Client::new();
    let order: GatewayOrder = client
        .post(format!("{RAZORPAY_API_BASE}/orders"))
        .basic_auth(&config.key_id, Some(&config.key_secret))
        .json(&serde_json::json!({
            "amount": amount,
            "currency": currency,
            "payment_capture": 1,
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(CheckoutOrder {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_a_signature_over_order_and_payment_ids() {
        let signature = sign("secret", "order_abc", "pay_xyz");
        assert!(verify_payment_signature(
            "secret",
            "order_abc",
            "pay_xyz",
            &signature
        ));
    }

    #[test]
    fn rejects_a_signature_for_different_ids() {
        let signature = sign("secret", "order_abc", "pay_xyz");
        assert!(!verify_payment_signature(
            "secret",
            "order_abc",
            "pay_other",
            &signature
        ));
        assert!(!verify_payment_signature(
            "secret",
            "order_other",
            "pay_xyz",
            &signature
        ));
    }

    #[test]
    fn rejects_a_signature_made_with_another_secret() {
        let signature = sign("not-the-secret", "order_abc", "pay_xyz");
        assert!(!verify_payment_signature(
            "secret",
            "order_abc",
            "pay_xyz",
            &signature
        ));
    }

    #[test]
    fn rejects_garbage_that_is_not_hex() {
        assert!(!verify_payment_signature(
            "secret",
            "order_abc",
            "pay_xyz",
            "zz-not-hex"
        ));
        assert!(!verify_payment_signature("secret", "order_abc", "pay_xyz", ""));
    }
}
