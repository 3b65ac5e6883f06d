use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::auth::social::IdentityError;
use crate::payments::GatewayError;

/// Unified application error type that maps to JSON HTTP responses.
///
/// Rendered as `{ "error": { "code": "...", "message": "..." } }`.
#[derive(Debug)]
pub enum AppError {
    /// 401, missing, invalid or expired session
    Unauthorized(String),
    /// 403, authenticated but the role does not allow the operation
    Forbidden(String),
    /// 404, unknown resource or one owned by someone else
    NotFound(String),
    /// 409, the entity is not in a state that permits the transition
    InvalidState(String),
    /// 409, the event has no slots left
    NoCapacity(String),
    /// 409
    DuplicateEmail(String),
    /// 400, the payment provider rejected the confirmation
    PaymentInvalid(String),
    /// 422
    Validation(String),
    /// 502, the payment or identity provider could not be reached or refused the order
    Upstream(String),
    /// 500 (wraps any error, logs details, returns generic message)
    Internal(anyhow::Error),
}

impl AppError {
    /// Map a gateway failure during order creation or confirmation.
    ///
    /// Signature and unknown-order failures mean the client sent a bad confirmation;
    /// everything else is the provider's problem.
    #[must_use]
    pub fn from_gateway(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidSignature | GatewayError::UnknownOrder(_) => {
                Self::PaymentInvalid("Payment verification failed".to_string())
            }
            GatewayError::Http(_) | GatewayError::Rejected { .. } => {
                tracing::warn!(error = %err, "Payment provider call failed");
                Self::Upstream("Payment provider unavailable".to_string())
            }
        }
    }

    /// Map a failed social session exchange. A refused session is the caller's
    /// problem; a transport failure is the provider's.
    #[must_use]
    pub fn from_identity(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected(_) => Self::Unauthorized("Invalid session".to_string()),
            IdentityError::Http(_) => {
                tracing::warn!(error = %err, "Identity provider call failed");
                Self::Upstream("Identity provider unavailable".to_string())
            }
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::NoCapacity(_) => "NO_CAPACITY",
            Self::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            Self::PaymentInvalid(_) => "PAYMENT_INVALID",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) | Self::NoCapacity(_) | Self::DuplicateEmail(_) => {
                StatusCode::CONFLICT
            }
            Self::PaymentInvalid(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::InvalidState(msg)
            | Self::NoCapacity(msg)
            | Self::DuplicateEmail(msg)
            | Self::PaymentInvalid(msg)
            | Self::Validation(msg)
            | Self::Upstream(msg) => msg,
            Self::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                "An internal error occurred".to_string()
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            })),
        )
            .into_response()
    }
}

/// Allow `?` to automatically convert any `anyhow::Error` into `AppError::Internal`.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
