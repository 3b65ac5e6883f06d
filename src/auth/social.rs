//! Social sign-in: trade a hosted login's session id for the identity behind it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;

/// Header carrying the session id to the identity provider.
const SESSION_HEADER: &str = "X-Session-ID";

/// Who the provider says is signing in.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialIdentity {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity provider rejected the session ({0})")]
    Rejected(u16),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn session_data(&self, session_id: &str) -> Result<SocialIdentity, IdentityError>;
}

/// Identity provider reached over HTTP at `SOCIAL_AUTH_URL`.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    url: String,
}

impl HttpIdentityProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: String) -> Result<Self, IdentityError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn session_data(&self, session_id: &str) -> Result<SocialIdentity, IdentityError> {
        let response = self
            .client
            .get(&self.url)
            .header(SESSION_HEADER, session_id)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdentityError::Rejected(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}
