mod admin;
mod auth;
mod events;
mod health;
mod mentor;
mod user;

use axum::Router;

use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health` liveness check
/// - `/api/v1/health` with a database ping
/// - `/api/v1/auth/...` sessions and registration
/// - `/api/v1/events/...` public catalogue and booking
/// - `/api/v1/user/...`, `/api/v1/mentor/...`, `/api/v1/admin/...` role-scoped areas
pub fn router() -> Router<AppState> {
    let api_v1 = Router::new()
        .merge(health::api_router())
        .nest("/auth", auth::router())
        .nest("/events", events::router())
        .nest("/user", user::router())
        .nest("/mentor", mentor::router())
        .nest("/admin", admin::router());

    Router::new()
        .merge(health::root_router())
        .nest("/api/v1", api_v1)
}
