use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("payment gateway error: {0}")]
    Payment(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("time slot is already booked")]
    SlotUnavailable,

    #[error("authentication required")]
    Unauthenticated,

    #[error("unauthorized")]
    Unauthorized,

    #[error("review already exists for this booking")]
    DuplicateReview,

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    /// Stable machine-readable code so callers can branch on the error kind
    /// without parsing message text.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "internal",
            AppError::Payment(_) => "payment",
            AppError::NotFound(_) => "not_found",
            AppError::SlotUnavailable => "slot_unavailable",
            AppError::Unauthenticated => "unauthenticated",
            AppError::Unauthorized => "unauthorized",
            AppError::DuplicateReview => "duplicate_review",
            AppError::Validation(_) => "validation",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Payment(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SlotUnavailable | AppError::DuplicateReview => StatusCode::CONFLICT,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string(), "code": self.code() });
        (status, axum::Json(body)).into_response()
    }
}
