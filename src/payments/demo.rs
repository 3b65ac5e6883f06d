use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;
use uuid::Uuid;

use super::{GatewayError, GatewayOrder, OrderRequest, PaymentConfirmation, PaymentGateway};

/// In-process gateway for local development and tests.
///
/// Each order gets a six-digit code; confirming requires echoing it back as the
/// signature. Orders are kept after confirmation so a replayed confirmation still
/// verifies and the coordinator can report it as already processed. Orders older
/// than the TTL are forgotten and pruned whenever a new one is opened.
#[derive(Debug)]
pub struct DemoGateway {
    orders: DashMap<String, DemoOrder>,
    ttl: Duration,
}

#[derive(Debug)]
struct DemoOrder {
    code: String,
    opened_at: Instant,
}

impl DemoOrder {
    fn is_live(&self, ttl: Duration) -> bool {
        self.opened_at.elapsed() < ttl
    }
}

const DEFAULT_ORDER_TTL: Duration = Duration::from_secs(24 * 60 * 60);

impl DemoGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_ORDER_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            orders: DashMap::new(),
            ttl,
        }
    }

    fn live_code(&self, order_id: &str) -> Option<String> {
        self.orders
            .get(order_id)
            .filter(|o| o.is_live(self.ttl))
            .map(|o| o.code.clone())
    }
}

impl Default for DemoGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for DemoGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let order_id = format!("order_demo_{}", Uuid::new_v4().simple());
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));

        self.orders.retain(|_, o| o.is_live(self.ttl));
        self.orders.insert(
            order_id.clone(),
            DemoOrder {
                code: code.clone(),
                opened_at: Instant::now(),
            },
        );

        tracing::debug!(
            order_id = %order_id,
            amount_minor = request.amount_minor,
            receipt = %request.receipt,
            "Demo order created"
        );

        Ok(GatewayOrder {
            order_id,
            demo_code: Some(code),
        })
    }

    async fn verify(&self, confirmation: &PaymentConfirmation) -> Result<(), GatewayError> {
        let code = self
            .live_code(&confirmation.order_id)
            .ok_or_else(|| GatewayError::UnknownOrder(confirmation.order_id.clone()))?;

        if confirmation.payment_id.is_empty() || code != confirmation.signature {
            return Err(GatewayError::InvalidSignature);
        }
        Ok(())
    }

    fn resume_order(&self, order_id: &str) -> Option<GatewayOrder> {
        self.live_code(order_id).map(|code| GatewayOrder {
            order_id: order_id.to_string(),
            demo_code: Some(code),
        })
    }

    fn key_id(&self) -> Option<&str> {
        None
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}
