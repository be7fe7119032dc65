pub mod razorpay;

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Online-payment collaborator. Amounts are in minor units (paise for INR).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> anyhow::Result<PaymentOrder>;

    /// Validates the callback signature the gateway sends after a customer
    /// pays, before the booking is finalized on the online path.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Public key id the client needs to open the checkout widget.
    fn key_id(&self) -> &str;
}
