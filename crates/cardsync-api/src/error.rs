use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cardsync_core::util::sanitize;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("External dependency error: {0}")]
    External(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<cardsync_core::Error> for AppError {
    fn from(error: cardsync_core::Error) -> Self {
        use cardsync_core::Error as Core;

        let message = sanitize(&error);
        match error {
            Core::Http(_) | Core::Store { .. } => Self::External(message),
            Core::Config(_) => Self::Config(message),
            Core::InvalidRecord { .. }
            | Core::UnresolvedRelation { .. }
            | Core::Io(_)
            | Core::Serialization(_) => Self::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::External(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
