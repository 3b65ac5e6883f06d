//! Transactional email.
//!
//! Delivery is best-effort: [`Notifier`] logs failures and never returns them, so a
//! mail outage cannot fail a booking or a registration.

pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::EmailConfig;

const RESEND_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Sends through the Resend HTTP API.
pub struct ResendMailer {
    client: Client,
    api_key: String,
    sender: String,
}

impl ResendMailer {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            api_key: config.resend_api_key.clone(),
            sender: config.sender_email.clone(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let response = self
            .client
            .post(RESEND_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.sender,
                "to": [message.to],
                "subject": message.subject,
                "html": message.html,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Resend returned {status}: {body}");
        }
        Ok(())
    }
}

/// Used when no API key is configured. Only records that a message would have gone out.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        tracing::info!(to = %message.to, subject = %message.subject, "Email disabled, not sent");
        Ok(())
    }
}

/// Pick the mailer for the given configuration.
///
/// # Errors
///
/// Returns an error if the Resend client cannot be built.
pub fn mailer_from_config(config: &EmailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    if config.resend_api_key.is_empty() {
        Ok(Arc::new(LogMailer))
    } else {
        Ok(Arc::new(ResendMailer::new(config)?))
    }
}

/// Domain-level email notifications.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, frontend_url: impl Into<String>) -> Self {
        Self {
            mailer,
            frontend_url: frontend_url.into(),
        }
    }

    pub async fn verification(&self, to: &str, name: &str, token: &str) {
        let link = format!("{}/verify-email?token={token}", self.frontend_url);
        self.deliver(templates::verification(to, name, &link)).await;
    }

    pub async fn booking_confirmation(&self, to: &str, name: &str, event_title: &str) {
        self.deliver(templates::booking_confirmation(to, name, event_title))
            .await;
    }

    pub async fn new_verified_lead(&self, to: &str, event_title: &str) {
        let link = format!("{}/mentor/leads", self.frontend_url);
        self.deliver(templates::new_verified_lead(to, event_title, &link))
            .await;
    }

    pub async fn mentor_decision(&self, to: &str, name: &str, approved: bool) {
        self.deliver(templates::mentor_decision(to, name, approved))
            .await;
    }

    pub async fn invitation(&self, to: &str, name: &str, event_title: &str, ticket_price: f64) {
        let link = format!("{}/user/invitations", self.frontend_url);
        self.deliver(templates::invitation(
            to,
            name,
            event_title,
            ticket_price,
            &link,
        ))
        .await;
    }

    async fn deliver(&self, message: EmailMessage) {
        match self.mailer.send(&message).await {
            Ok(()) => tracing::info!(to = %message.to, subject = %message.subject, "Email sent"),
            Err(err) => tracing::warn!(
                to = %message.to,
                subject = %message.subject,
                error = %err,
                "Email delivery failed"
            ),
        }
    }
}
