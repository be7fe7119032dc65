use anyhow::Context;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::{PaymentGateway, PaymentOrder};

pub struct RazorpayGateway {
    key_id: String,
    key_secret: String,
    client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            key_id,
            key_secret,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> anyhow::Result<PaymentOrder> {
        let body = serde_json::json!({
            "amount": amount_minor,
            "currency": currency,
            "receipt": receipt,
            "payment_capture": 1,
        });

        let order: OrderResponse = self
            .client
            .post("https://api.razorpay.com/v1/orders")
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .context("failed to reach Razorpay")?
            .error_for_status()
            .context("Razorpay API returned error")?
            .json()
            .await
            .context("failed to parse Razorpay order response")?;

        Ok(PaymentOrder {
            order_id: order.id,
            amount_minor: order.amount,
            currency: order.currency,
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let payload = format!("{order_id}|{payment_id}");

        let mut mac = match Hmac::<Sha256>::new_from_slice(self.key_secret.as_bytes()) {
            Ok(m) => m,
            Err(_) => return false,
        };
        mac.update(payload.as_bytes());
        let expected = hex_encode(&mac.finalize().into_bytes());

        expected == signature
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex_encode(&mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_valid_signature() {
        let gateway = RazorpayGateway::new("rzp_test_key".to_string(), "secret".to_string());
        let signature = sign("secret", "order_123", "pay_456");
        assert!(gateway.verify_signature("order_123", "pay_456", &signature));
    }

    #[test]
    fn test_verify_rejects_tampered_signature() {
        let gateway = RazorpayGateway::new("rzp_test_key".to_string(), "secret".to_string());
        let signature = sign("secret", "order_123", "pay_456");
        assert!(!gateway.verify_signature("order_123", "pay_999", &signature));
        assert!(!gateway.verify_signature("order_123", "pay_456", "deadbeef"));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x0a]), "00ff0a");
    }
}
