use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::auth::{password, session};
use crate::entities::status::{MentorStatus, Role};
use crate::entities::{mentor_profile, user};
use crate::error::AppError;
use crate::state::AppState;

/// Verification links stay valid for a day.
const VERIFICATION_TTL_HOURS: i64 = 24;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the auth route group: `/auth/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route("/verify-email", post(verify_email))
        .route("/session", post(exchange_session))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
    pub bio: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    pub experience: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExchangeRequest {
    #[serde(alias = "session_id")]
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: user::Model,
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: user::Model,
    pub mentor_profile: Option<mentor_profile::Model>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn map_duplicate_email(err: DbErr) -> AppError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        AppError::DuplicateEmail("Email already registered".to_string())
    } else {
        AppError::Internal(err.into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/v1/auth/register`: create an account, sign it in and send the
/// verification email. Mentors get a `PENDING` profile in the same transaction.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let role = body.role.unwrap_or(Role::User);
    if !role.is_self_registrable() {
        return Err(AppError::Validation(
            "Role must be USER or MENTOR".to_string(),
        ));
    }

    let email = body.email.trim().to_lowercase();
    password::validate_email(&email).map_err(AppError::Validation)?;
    password::validate_password(&body.password).map_err(AppError::Validation)?;
    password::validate_name(&body.name).map_err(AppError::Validation)?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::DuplicateEmail(
            "Email already registered".to_string(),
        ));
    }

    let password_hash = password::hash_password(&body.password)?;
    let verification_token = Uuid::new_v4().simple().to_string();
    let now = Utc::now();

    let txn = state.db.begin().await?;

    let user_model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set(body.name.trim().to_string()),
        password_hash: Set(Some(password_hash)),
        picture: Set(None),
        role: Set(role),
        email_verified: Set(false),
        verification_token: Set(Some(verification_token.clone())),
        verification_token_expires_at: Set(Some(
            (now + Duration::hours(VERIFICATION_TTL_HOURS)).fixed_offset(),
        )),
        created_at: Set(now.fixed_offset()),
        updated_at: Set(now.fixed_offset()),
    }
    .insert(&txn)
    .await
    .map_err(map_duplicate_email)?;

    if role == Role::Mentor {
        mentor_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_model.id),
            bio: Set(body.bio),
            expertise: Set(serde_json::json!(body.expertise)),
            experience: Set(body.experience),
            verification_status: Set(MentorStatus::Pending),
            created_at: Set(now.fixed_offset()),
            updated_at: Set(now.fixed_offset()),
        }
        .insert(&txn)
        .await?;
    }

    let token = session::issue(&txn, user_model.id, state.config.session_ttl_days).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user_model.id, role = role.as_str(), "User registered");

    state
        .notifier
        .verification(&user_model.email, &user_model.name, &verification_token)
        .await;

    let jar = jar.add(session::session_cookie(token.clone(), &state.config));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: user_model,
            token,
        }),
    ))
}

/// `POST /api/v1/auth/login`
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user_model = user::Entity::find()
        .filter(user::Column::Email.eq(body.email.trim().to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or_else(invalid)?;

    // Social accounts have no password to check against.
    let Some(hash) = user_model.password_hash.as_deref() else {
        return Err(invalid());
    };
    if !password::verify_password(&body.password, hash)? {
        return Err(invalid());
    }

    let token = session::issue(&state.db, user_model.id, state.config.session_ttl_days).await?;
    tracing::info!(user_id = %user_model.id, "User logged in");

    let jar = jar.add(session::session_cookie(token.clone(), &state.config));
    Ok((
        jar,
        Json(AuthResponse {
            user: user_model,
            token,
        }),
    ))
}

/// `GET /api/v1/auth/me`
async fn me(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let mentor_profile = if user_model.role == Role::Mentor {
        mentor_profile::Entity::find()
            .filter(mentor_profile::Column::UserId.eq(user_model.id))
            .one(&state.db)
            .await?
    } else {
        None
    };

    Ok(Json(MeResponse {
        user: user_model,
        mentor_profile,
    }))
}

/// `POST /api/v1/auth/logout`: revoke the current session and clear the cookie.
async fn logout(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    if let Some(token) = session::extract_token(&headers) {
        session::revoke(&state.db, &token).await?;
    }
    tracing::info!(user_id = %user_model.id, "User logged out");

    Ok((
        jar.remove(session::removal_cookie()),
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

/// `POST /api/v1/auth/session`: trade a social-login session id for a local
/// session. Unknown emails become `USER` accounts; known ones get their name
/// and picture refreshed and keep their role.
async fn exchange_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SessionExchangeRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let session_id = body.session_id.trim();
    if session_id.is_empty() {
        return Err(AppError::Validation("Session id is required".to_string()));
    }

    let identity = state
        .identity
        .session_data(session_id)
        .await
        .map_err(AppError::from_identity)?;

    let email = identity.email.trim().to_lowercase();
    password::validate_email(&email).map_err(AppError::Validation)?;
    password::validate_name(&identity.name).map_err(AppError::Validation)?;
    let name = identity.name.trim().to_string();

    let now = Utc::now().fixed_offset();
    let txn = state.db.begin().await?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&txn)
        .await?;

    let user_model = if let Some(existing) = existing {
        let mut active: user::ActiveModel = existing.into();
        active.name = Set(name);
        active.picture = Set(identity.picture);
        active.updated_at = Set(now);
        active.update(&txn).await?
    } else {
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            name: Set(name),
            password_hash: Set(None),
            picture: Set(identity.picture),
            role: Set(Role::User),
            email_verified: Set(true),
            verification_token: Set(None),
            verification_token_expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(map_duplicate_email)?
    };

    let token = session::issue(&txn, user_model.id, state.config.session_ttl_days).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user_model.id, "Social session exchanged");

    let jar = jar.add(session::session_cookie(token.clone(), &state.config));
    Ok((
        jar,
        Json(AuthResponse {
            user: user_model,
            token,
        }),
    ))
}

/// `POST /api/v1/auth/verify-email`: consume a verification token.
async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_model = user::Entity::find()
        .filter(user::Column::VerificationToken.eq(body.token.trim()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid verification token".to_string()))?;

    let expired = user_model
        .verification_token_expires_at
        .is_none_or(|at| at < Utc::now().fixed_offset());
    if expired {
        return Err(AppError::Validation(
            "Verification token has expired".to_string(),
        ));
    }

    let user_id = user_model.id;
    let mut active: user::ActiveModel = user_model.into();
    active.email_verified = Set(true);
    active.verification_token = Set(None);
    active.verification_token_expires_at = Set(None);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(&state.db).await?;

    tracing::info!(user_id = %user_id, "Email verified");

    Ok(Json(MessageResponse {
        message: "Email verified".to_string(),
    }))
}
