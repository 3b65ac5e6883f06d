use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::social::{HttpIdentityProvider, IdentityError, IdentityProvider};
use crate::config::{Config, PaymentProvider};
use crate::email::{Mailer, Notifier};
use crate::payments::{DemoGateway, GatewayError, PaymentGateway, RazorpayGateway};
use crate::services::payments::PaymentCoordinator;

/// Shared application state available to all request handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub payments: PaymentCoordinator,
    pub notifier: Notifier,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Wire the collaborators together. Tests pass their own gateway, mailer and
    /// identity provider.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        config: Config,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let payments =
            PaymentCoordinator::new(db.clone(), gateway, config.payment.currency.clone());
        let notifier = Notifier::new(mailer, config.frontend_url.clone());
        Self {
            db,
            config,
            payments,
            notifier,
            identity,
        }
    }
}

/// Build the gateway selected by `PAYMENT_PROVIDER`.
///
/// # Errors
///
/// Returns an error if the Razorpay HTTP client cannot be built.
pub fn gateway_from_config(config: &Config) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
    match config.payment.provider {
        PaymentProvider::Razorpay => Ok(Arc::new(RazorpayGateway::new(
            config.payment.razorpay_key_id.clone(),
            config.payment.razorpay_key_secret.clone(),
        )?)),
        PaymentProvider::Demo => Ok(Arc::new(DemoGateway::new())),
    }
}

/// Build the social sign-in client for `SOCIAL_AUTH_URL`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn identity_from_config(config: &Config) -> Result<Arc<dyn IdentityProvider>, IdentityError> {
    Ok(Arc::new(HttpIdentityProvider::new(
        config.social_auth_url.clone(),
    )?))
}
