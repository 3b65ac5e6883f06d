#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use leadbridge_api::auth::social::{IdentityError, IdentityProvider, SocialIdentity};
use leadbridge_api::config::{
    Config, EmailConfig, Environment, PaymentConfig, PaymentProvider,
};
use leadbridge_api::email::{EmailMessage, Mailer};
use leadbridge_api::payments::DemoGateway;
use leadbridge_api::services::accounts::seed_admin;
use leadbridge_api::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@leadbridge.test";
pub const ADMIN_PASSWORD: &str = "AdminPass123";
pub const PASSWORD: &str = "Password123";

/// Captures outgoing mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn subjects_to(&self, to: &str) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| {
                sent.iter()
                    .filter(|m| m.to == to)
                    .map(|m| m.subject.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }
}

/// Session id the fake identity provider accepts.
pub const SOCIAL_SESSION: &str = "social-session-1";
pub const SOCIAL_EMAIL: &str = "social@example.com";

/// Knows exactly one social session; everything else is refused.
pub struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn session_data(&self, session_id: &str) -> Result<SocialIdentity, IdentityError> {
        if session_id != SOCIAL_SESSION {
            return Err(IdentityError::Rejected(401));
        }
        Ok(SocialIdentity {
            email: SOCIAL_EMAIL.to_string(),
            name: "Social Person".to_string(),
            picture: Some("https://img.example/social.png".to_string()),
        })
    }
}

/// Every send fails, as if the provider were down.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &EmailMessage) -> anyhow::Result<()> {
        anyhow::bail!("smtp provider unavailable")
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub mailer: Arc<RecordingMailer>,
    _scratch: Option<TempDir>,
}

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_host: std::net::IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment: Environment::Development,
        log_level: "warn".to_string(),
        frontend_url: "http://localhost:3000".to_string(),
        session_ttl_days: 7,
        payment: PaymentConfig {
            provider: PaymentProvider::Demo,
            razorpay_key_id: String::new(),
            razorpay_key_secret: String::new(),
            currency: "INR".to_string(),
        },
        email: EmailConfig {
            resend_api_key: String::new(),
            sender_email: "noreply@leadbridge.test".to_string(),
        },
        social_auth_url: "http://identity.invalid/session-data".to_string(),
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
    }
}

async fn prepare(db: &DatabaseConnection, config: &Config) {
    Migrator::up(db, None).await.unwrap_or_default();
    seed_admin(db, config).await.unwrap_or_default();
}

async fn test_db(config: &Config) -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap_or_default();
    prepare(&db, config).await;
    db
}

fn build_state(db: DatabaseConnection, config: Config, mailer: Arc<dyn Mailer>) -> AppState {
    AppState::new(
        db,
        config,
        Arc::new(DemoGateway::new()),
        mailer,
        Arc::new(FakeIdentityProvider),
    )
}

fn assemble(db: DatabaseConnection, config: Config, scratch: Option<TempDir>) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let state = build_state(db.clone(), config, mailer.clone());
    TestApp {
        router: leadbridge_api::routes::router().with_state(state),
        db,
        mailer,
        _scratch: scratch,
    }
}

pub async fn test_app() -> TestApp {
    let config = test_config();
    let db = test_db(&config).await;
    assemble(db, config, None)
}

/// App on a WAL file database with several pooled connections, so requests
/// sent together really run in separate transactions.
pub async fn test_app_pooled() -> TestApp {
    let config = test_config();
    let scratch = TempDir::new().ok();
    let path = scratch
        .as_ref()
        .map(|dir| dir.path().join("leadbridge.db"))
        .unwrap_or_default();

    let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    opts.max_connections(8).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap_or_default();
    assert!(db.execute_unprepared("PRAGMA journal_mode=WAL").await.is_ok());
    prepare(&db, &config).await;
    assemble(db, config, scratch)
}

/// App whose mailer always fails.
pub async fn test_app_with_failing_mail() -> Router {
    let config = test_config();
    let db = test_db(&config).await;
    let state = build_state(db, config, Arc::new(FailingMailer));
    leadbridge_api::routes::router().with_state(state)
}

// ──────────────────────────────────────────────────────────────────────────────
// Request helpers
// ──────────────────────────────────────────────────────────────────────────────

/// Send a request and return (status, parsed JSON body). Non-JSON bodies become `Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<&Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap_or_default(),
        None => builder.body(Body::empty()).unwrap_or_default(),
    };

    let response = app.clone().oneshot(request).await.unwrap_or_default();

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, None).await
}

pub async fn get_with_auth(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, Some(token)).await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body), None).await
}

pub async fn post_json_with_auth(
    app: &Router,
    uri: &str,
    body: &Value,
    token: &str,
) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body), Some(token)).await
}

pub async fn put_json_with_auth(
    app: &Router,
    uri: &str,
    body: &Value,
    token: &str,
) -> (StatusCode, Value) {
    send(app, "PUT", uri, Some(body), Some(token)).await
}

pub async fn delete_with_auth(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, "DELETE", uri, None, Some(token)).await
}

pub fn str_field(json: &Value, key: &str) -> String {
    json[key].as_str().unwrap_or_default().to_string()
}

// ──────────────────────────────────────────────────────────────────────────────
// Flow helpers
// ──────────────────────────────────────────────────────────────────────────────

/// Register an account and return (token, user JSON).
pub async fn register(app: &Router, email: &str, role: &str) -> (String, Value) {
    let (status, body) = post_json(
        app,
        "/api/v1/auth/register",
        &json!({
            "email": email,
            "password": PASSWORD,
            "name": "Test Person",
            "role": role,
            "expertise": ["rust"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (str_field(&body, "token"), body["user"].clone())
}

pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = post_json(
        app,
        "/api/v1/auth/login",
        &json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    str_field(&body, "token")
}

pub async fn admin_token(app: &Router) -> String {
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Register a mentor and have the admin approve them. Returns (token, profile id).
pub async fn approved_mentor(app: &Router, email: &str) -> (String, String) {
    let (token, _) = register(app, email, "MENTOR").await;
    let (_, me) = get_with_auth(app, "/api/v1/auth/me", &token).await;
    let profile_id = str_field(&me["mentorProfile"], "id");

    let admin = admin_token(app).await;
    let (status, body) = put_json_with_auth(
        app,
        &format!("/api/v1/admin/mentors/{profile_id}/verify"),
        &json!({ "status": "APPROVED" }),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "mentor approval failed: {body}");

    (token, profile_id)
}

/// Create an event and return its id.
pub async fn create_event(app: &Router, mentor_token: &str, slots: i32, price: f64) -> String {
    let (status, body) = post_json_with_auth(
        app,
        "/api/v1/mentor/events",
        &json!({
            "title": "Intro to Rust",
            "description": "Ownership and borrowing",
            "category": "programming",
            "eventDatetime": "2026-12-01T10:00:00+00:00",
            "durationMinutes": 60,
            "availableSlots": slots,
            "pricePerLead": price,
        }),
        mentor_token,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create event failed: {body}");
    str_field(&body, "id")
}

pub async fn book(
    app: &Router,
    user_token: &str,
    event_id: &str,
    email: &str,
    phone: &str,
) -> (StatusCode, Value) {
    post_json_with_auth(
        app,
        &format!("/api/v1/events/{event_id}/book"),
        &json!({
            "name": "Guest Person",
            "email": email,
            "phone": phone,
            "message": "Looking forward to it",
        }),
        user_token,
    )
    .await
}

/// Book with details that pass auto-verification and return the lead id.
pub async fn book_verified(app: &Router, user_token: &str, event_id: &str) -> String {
    let (status, body) = book(app, user_token, event_id, "guest@example.com", "9876543210").await;
    assert_eq!(status, StatusCode::CREATED, "booking failed: {body}");
    str_field(&body["lead"], "id")
}

pub async fn event_slots(app: &Router, event_id: &str) -> i64 {
    let (_, body) = get(app, &format!("/api/v1/events/{event_id}")).await;
    body["availableSlots"].as_i64().unwrap_or(-1)
}

/// Begin a lead purchase and return the payment handle JSON.
pub async fn begin_purchase(app: &Router, mentor_token: &str, lead_id: &str) -> Value {
    let (status, body) = post_json_with_auth(
        app,
        &format!("/api/v1/mentor/leads/{lead_id}/purchase"),
        &json!({}),
        mentor_token,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "purchase failed: {body}");
    body
}

pub fn confirmation_for(handle: &Value) -> Value {
    json!({
        "orderId": handle["orderId"],
        "paymentId": "pay_test_001",
        "signature": handle["demoCode"],
    })
}

/// Run a full purchase and return the confirm response.
pub async fn purchase_lead(app: &Router, mentor_token: &str, lead_id: &str) -> Value {
    let handle = begin_purchase(app, mentor_token, lead_id).await;
    let (status, body) = post_json_with_auth(
        app,
        "/api/v1/mentor/payment-verify",
        &confirmation_for(&handle),
        mentor_token,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "payment verify failed: {body}");
    body
}
