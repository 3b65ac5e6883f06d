use std::net::{IpAddr, SocketAddr};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub frontend_url: String,
    pub session_ttl_days: i64,
    pub payment: PaymentConfig,
    pub email: EmailConfig,
    /// Session-data endpoint of the hosted social login.
    pub social_auth_url: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Which payment gateway backs the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentProvider {
    Razorpay,
    Demo,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub provider: PaymentProvider,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Empty disables outbound mail; messages are only logged.
    pub resend_api_key: String,
    pub sender_email: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`
    /// Optional with defaults: `SERVER_HOST`, `SERVER_PORT`, `ENVIRONMENT`, `LOG_LEVEL`,
    /// `FRONTEND_URL`, `SESSION_TTL_DAYS`, `PAYMENT_PROVIDER`, `RAZORPAY_KEY_ID`,
    /// `RAZORPAY_KEY_SECRET`, `PAYMENT_CURRENCY`, `RESEND_API_KEY`, `SENDER_EMAIL`,
    /// `SOCIAL_AUTH_URL`, `ADMIN_EMAIL`, `ADMIN_PASSWORD`
    ///
    /// `PORT` overrides `SERVER_PORT` and host defaults to `0.0.0.0` in production.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is not set, if a numeric or address variable
    /// cannot be parsed, or if `PAYMENT_PROVIDER=razorpay` is set without keys.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let environment = match std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let server_port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?;

        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = std::env::var("SERVER_HOST")
            .unwrap_or_else(|_| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let session_ttl_days = std::env::var("SESSION_TTL_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()
            .ok()
            .filter(|days| *days > 0)
            .ok_or_else(|| anyhow::anyhow!("SESSION_TTL_DAYS must be a positive integer"))?;

        let razorpay_key_id = std::env::var("RAZORPAY_KEY_ID").unwrap_or_default();
        let razorpay_key_secret = std::env::var("RAZORPAY_KEY_SECRET").unwrap_or_default();
        let provider = parse_provider(
            std::env::var("PAYMENT_PROVIDER").ok().as_deref(),
            !razorpay_key_id.is_empty() && !razorpay_key_secret.is_empty(),
        )?;

        let payment = PaymentConfig {
            provider,
            razorpay_key_id,
            razorpay_key_secret,
            currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
        };

        let email = EmailConfig {
            resend_api_key: std::env::var("RESEND_API_KEY").unwrap_or_default(),
            sender_email: std::env::var("SENDER_EMAIL")
                .unwrap_or_else(|_| "onboarding@resend.dev".to_string()),
        };

        let social_auth_url = std::env::var("SOCIAL_AUTH_URL")
            .unwrap_or_else(|_| DEFAULT_SOCIAL_AUTH_URL.to_string());

        let admin_email = std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty());
        let admin_password = std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());

        Ok(Self {
            database_url,
            server_host,
            server_port,
            environment,
            log_level,
            frontend_url,
            session_ttl_days,
            payment,
            email,
            social_auth_url,
            admin_email,
            admin_password,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

const DEFAULT_SOCIAL_AUTH_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";

/// Resolve `PAYMENT_PROVIDER`. Unset falls back to Razorpay when keys are present.
fn parse_provider(raw: Option<&str>, has_keys: bool) -> anyhow::Result<PaymentProvider> {
    match raw.map(str::to_lowercase).as_deref() {
        Some("demo") => Ok(PaymentProvider::Demo),
        Some("razorpay") if has_keys => Ok(PaymentProvider::Razorpay),
        Some("razorpay") => Err(anyhow::anyhow!(
            "PAYMENT_PROVIDER=razorpay requires RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET"
        )),
        Some(other) if !other.is_empty() => {
            Err(anyhow::anyhow!("Unknown PAYMENT_PROVIDER: {other}"))
        }
        _ if has_keys => Ok(PaymentProvider::Razorpay),
        _ => Ok(PaymentProvider::Demo),
    }
}
