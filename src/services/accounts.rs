use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::auth::password;
use crate::config::Config;
use crate::entities::status::Role;
use crate::entities::user;

/// Create the bootstrap admin from `ADMIN_EMAIL` / `ADMIN_PASSWORD` if it does not exist.
///
/// Returns the admin's id when credentials are configured.
///
/// # Errors
///
/// Returns an error if the lookup, hashing or insert fails, or if the email is
/// already taken by a non-admin account.
pub async fn seed_admin(db: &DatabaseConnection, config: &Config) -> anyhow::Result<Option<Uuid>> {
    let (Some(email), Some(plain_password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(None);
    };
    let email = email.trim().to_lowercase();

    if let Some(existing) = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?
    {
        if existing.role != Role::Admin {
            anyhow::bail!("ADMIN_EMAIL {email} belongs to a non-admin account");
        }
        return Ok(Some(existing.id));
    }

    let now = Utc::now().fixed_offset();
    let admin = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.clone()),
        name: Set("Administrator".to_string()),
        password_hash: Set(Some(password::hash_password(plain_password)?)),
        picture: Set(None),
        role: Set(Role::Admin),
        email_verified: Set(true),
        verification_token: Set(None),
        verification_token_expires_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = %admin.id, email = %email, "Admin account seeded");
    Ok(Some(admin.id))
}
