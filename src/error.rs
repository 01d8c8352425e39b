//! Error taxonomy of the gateway and its mapping onto HTTP responses.
//!
//! | Variant | Status |
//! |---------|--------|
//! | `Authentication` | 401 |
//! | `Validation` | 400 |
//! | `Authorization` | 403 |
//! | `Pricing` | 400 |
//! | `NotTradable` | 400 |
//! | `Upstream` | 500 |
//! | `Internal` | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a collaborator (trading server, quote feed, credential store).
/// The message is carried to the client unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct VenueError(pub String);

impl VenueError {
    pub fn new(message: impl Into<String>) -> Self {
        VenueError(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Bad credentials, or a missing, malformed or expired session token.
    #[error("{0}")]
    Authentication(String),

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Caller does not own the target trade.
    #[error("{0}")]
    Authorization(String),

    /// No live quote for the symbol.
    #[error("{0}")]
    Pricing(String),

    #[error("{0}")]
    NotTradable(String),

    #[error("{0}")]
    Upstream(String),

    /// Wiring or signing fault. Never shown to the client verbatim.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        GatewayError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Authentication(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Validation { .. }
            | GatewayError::Pricing(_)
            | GatewayError::NotTradable(_) => StatusCode::BAD_REQUEST,
            GatewayError::Authorization(_) => StatusCode::FORBIDDEN,
            GatewayError::Upstream(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<VenueError> for GatewayError {
    fn from(err: VenueError) -> Self {
        GatewayError::Upstream(err.0)
    }
}

/// JSON error body: `{"code": 400, "message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpError {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            GatewayError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(HttpError {
                code: status.as_u16(),
                message,
            }),
        )
            .into_response()
    }
}
