use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::profile::FetchError;
use crate::spotify::auth::TokenExchangeError;

/// Application error type. Rendered as plain text.
#[derive(Debug)]
pub enum AppError {
    /// A required upstream call failed.
    Upstream(String),
    /// The token endpoint refused the code; carries its raw body.
    TokenExchange(String),
    /// The provider redirected back without a code.
    MissingAuthorizationCode,
    /// The user (or the provider) refused the authorization request.
    AuthorizationDenied(String),
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        tracing::warn!(error = %e, cause = ?std::error::Error::source(&e), "user data fetch failed");
        AppError::Upstream(e.to_string())
    }
}

impl From<TokenExchangeError> for AppError {
    fn from(e: TokenExchangeError) -> Self {
        match e {
            TokenExchangeError::Rejected { body, .. } => AppError::TokenExchange(body),
            other => AppError::TokenExchange(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::TokenExchange(body) => (
                StatusCode::BAD_GATEWAY,
                format!("Error fetching access token: {}", body),
            ),
            AppError::MissingAuthorizationCode => {
                (StatusCode::BAD_REQUEST, "Missing authorization code.".to_string())
            }
            AppError::AuthorizationDenied(reason) => (
                StatusCode::BAD_REQUEST,
                format!("Authorization failed: {}", reason),
            ),
        };
        (status, message).into_response()
    }
}
