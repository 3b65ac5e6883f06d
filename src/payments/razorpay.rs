use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

use super::{GatewayError, GatewayOrder, OrderRequest, PaymentConfirmation, PaymentGateway};

type HmacSha256 = Hmac<Sha256>;

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

/// Razorpay Orders API client with checkout signature verification.
#[derive(Clone)]
pub struct RazorpayGateway {
    client: Client,
    key_id: String,
    key_secret: String,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
}

impl RazorpayGateway {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(key_id: String, key_secret: String) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            key_id,
            key_secret,
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .client
            .post(ORDERS_URL)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": request.amount_minor,
                "currency": request.currency,
                "receipt": request.receipt,
                "payment_capture": 1,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let order: OrderResponse = response.json().await?;
        Ok(GatewayOrder {
            order_id: order.id,
            demo_code: None,
        })
    }

    async fn verify(&self, confirmation: &PaymentConfirmation) -> Result<(), GatewayError> {
        verify_signature(
            &self.key_secret,
            &confirmation.order_id,
            &confirmation.payment_id,
            &confirmation.signature,
        )
    }

    fn resume_order(&self, order_id: &str) -> Option<GatewayOrder> {
        // Razorpay refuses a second capture on an order that is already paid.
        Some(GatewayOrder {
            order_id: order_id.to_string(),
            demo_code: None,
        })
    }

    fn key_id(&self) -> Option<&str> {
        Some(&self.key_id)
    }

    fn name(&self) -> &'static str {
        "razorpay"
    }
}

/// Checkout signature is `hex(HMAC_SHA256(secret, "{order_id}|{payment_id}"))`.
fn verify_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<(), GatewayError> {
    let expected = hex::decode(signature).map_err(|_| GatewayError::InvalidSignature)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| GatewayError::InvalidSignature)?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| GatewayError::InvalidSignature)
}
