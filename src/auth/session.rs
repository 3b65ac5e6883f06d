//! Opaque session tokens.
//!
//! The client holds `session_<uuid>`; the database only stores its SHA-256 so a
//! leaked table cannot be replayed.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::{user, user_session};
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session_token";

#[must_use]
pub fn generate_token() -> String {
    format!("session_{}", Uuid::new_v4().simple())
}

#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Session token from the cookie, falling back to `Authorization: Bearer`.
#[must_use]
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Persist a new session for `user_id` and return the raw token.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn issue<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    ttl_days: i64,
) -> Result<String, AppError> {
    let token = generate_token();
    let now = Utc::now();

    user_session::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token_hash: Set(hash_token(&token)),
        expires_at: Set((now + Duration::days(ttl_days)).fixed_offset()),
        created_at: Set(now.fixed_offset()),
    }
    .insert(conn)
    .await?;

    Ok(token)
}

/// Resolve a raw token to its user. Expired sessions are deleted on sight.
///
/// # Errors
///
/// `Unauthorized` for unknown or expired tokens.
pub async fn resolve(db: &DatabaseConnection, token: &str) -> Result<user::Model, AppError> {
    let session = user_session::Entity::find()
        .filter(user_session::Column::TokenHash.eq(hash_token(token)))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid session".to_string()))?;

    if session.expires_at < Utc::now().fixed_offset() {
        user_session::Entity::delete_by_id(session.id)
            .exec(db)
            .await?;
        return Err(AppError::Unauthorized("Session expired".to_string()));
    }

    user::Entity::find_by_id(session.user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid session".to_string()))
}

/// Delete the session backing `token`, if any.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn revoke(db: &DatabaseConnection, token: &str) -> Result<(), AppError> {
    user_session::Entity::delete_many()
        .filter(user_session::Column::TokenHash.eq(hash_token(token)))
        .exec(db)
        .await?;
    Ok(())
}

/// `HttpOnly` cookie carrying the token. Cross-site attributes only in production.
#[must_use]
pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    let builder = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/");
    if config.is_production() {
        builder.secure(true).same_site(SameSite::None).build()
    } else {
        builder.same_site(SameSite::Lax).build()
    }
}

#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
