//! Payment provider seam.
//!
//! The coordinator in [`crate::services::payments`] only talks to a
//! [`PaymentGateway`]; which provider sits behind it is decided once at startup.

mod demo;
mod razorpay;

use async_trait::async_trait;
use serde::Deserialize;

pub use demo::DemoGateway;
pub use razorpay::RazorpayGateway;

/// Failures surfaced by a gateway. Mapped to HTTP by `AppError::from_gateway`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payment provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("payment signature mismatch")]
    InvalidSignature,
    #[error("unknown order {0}")]
    UnknownOrder(String),
}

/// Order to open with the provider. Amounts are in minor units (paise).
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_id: String,
    /// Code the client echoes back as its signature. Only the demo gateway sets it.
    pub demo_code: Option<String>,
}

/// What the client posts back after checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    #[serde(alias = "razorpay_order_id")]
    pub order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(alias = "razorpay_signature")]
    pub signature: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder, GatewayError>;

    /// Check that the confirmation was produced by the provider for this order.
    async fn verify(&self, confirmation: &PaymentConfirmation) -> Result<(), GatewayError>;

    /// Hand back an order opened earlier so checkout can retry it, or `None`
    /// if the provider no longer knows it.
    fn resume_order(&self, order_id: &str) -> Option<GatewayOrder>;

    /// Public key id handed to the checkout widget, if the provider has one.
    fn key_id(&self) -> Option<&str>;

    fn name(&self) -> &'static str;
}

/// Convert a major-unit amount to minor units, rounding half away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
