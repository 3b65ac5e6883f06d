use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::auth::session;
use crate::entities::status::Role;
use crate::entities::{mentor_profile, user};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user, resolved from the `session_token` cookie or a bearer token.
///
/// ```ignore
/// async fn handler(AuthUser(user): AuthUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session::extract_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

        let user_model = session::resolve(&state.db, &token).await?;
        Ok(Self(user_model))
    }
}

/// Requires the `USER` role (event attendees).
#[derive(Debug, Clone)]
pub struct GuestUser(pub user::Model);

impl FromRequestParts<AppState> for GuestUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_model) = AuthUser::from_request_parts(parts, state).await?;

        if user_model.role != Role::User {
            return Err(AppError::Forbidden("User role required".to_string()));
        }

        Ok(Self(user_model))
    }
}

/// Requires the `MENTOR` role and loads the mentor's profile.
#[derive(Debug, Clone)]
pub struct MentorUser {
    pub user: user::Model,
    pub profile: mentor_profile::Model,
}

impl FromRequestParts<AppState> for MentorUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_model) = AuthUser::from_request_parts(parts, state).await?;

        if user_model.role != Role::Mentor {
            return Err(AppError::Forbidden("Mentor role required".to_string()));
        }

        let profile = mentor_profile::Entity::find()
            .filter(mentor_profile::Column::UserId.eq(user_model.id))
            .one(&state.db)
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .ok_or_else(|| AppError::Forbidden("Mentor profile not found".to_string()))?;

        Ok(Self {
            user: user_model,
            profile,
        })
    }
}

/// Requires the `ADMIN` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_model) = AuthUser::from_request_parts(parts, state).await?;

        if user_model.role != Role::Admin {
            return Err(AppError::Forbidden("Admin role required".to_string()));
        }

        Ok(Self(user_model))
    }
}
