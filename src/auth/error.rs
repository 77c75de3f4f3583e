use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::auth::jwt::TokenError;

/// Failure taxonomy for the auth subsystem.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password; deliberately indistinguishable.
    #[error("Incorrect username or password")]
    InvalidCredentials,
    /// Umbrella for every bearer-token resolution failure.
    #[error("Could not validate credentials")]
    Unauthorized,
    #[error("Inactive user")]
    InactiveAccount,
    #[error("Not enough privileges")]
    InsufficientPrivilege,
    #[error("Email already registered")]
    EmailTaken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<TokenError> for AuthError {
    fn from(_: TokenError) -> Self {
        AuthError::Unauthorized
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            // 401s carry the bearer challenge and a generic message only.
            AuthError::InvalidCredentials | AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                self.to_string(),
            )
                .into_response(),
            // The caller is already authenticated here, so the reason is safe
            // to spell out.
            AuthError::InactiveAccount | AuthError::InsufficientPrivilege => {
                (StatusCode::FORBIDDEN, self.to_string()).into_response()
            }
            AuthError::EmailTaken => (StatusCode::CONFLICT, self.to_string()).into_response(),
            AuthError::Internal(e) => {
                error!(error = %e, "internal auth error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
                    .into_response()
            }
        }
    }
}
