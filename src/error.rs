use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The single failure taxonomy for the entire request path. Handlers,
/// extractors, and the repository/storage/mail services all surface failures
/// as this type; the `IntoResponse` implementation below is the one boundary
/// where a failure becomes the JSON envelope sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing fields, bad identifier/date/price formats,
    /// or a mismatched relation (e.g. an artwork not owned by the artist).
    #[error("{0}")]
    InvalidInput(String),

    /// Missing, invalid, or expired session credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the caller's role does not permit the operation.
    #[error("{0}")]
    Forbidden(String),

    /// The target or a referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A unique field (email, phone number) is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Object storage rejected an upload or deletion.
    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    /// The mail transport rejected the notification.
    #[error("Failed to send notification email: {0}")]
    MailFailed(String),

    /// Unexpected persistence failure. Detail is logged, never sent out.
    #[error("database error")]
    Database(#[source] sqlx::Error),

    /// Any other unexpected server-side failure.
    #[error("{0}")]
    Internal(String),
}

/// Converts driver errors at the repository boundary. Unique-constraint
/// violations (Postgres code 23505) become `Conflict` so a race past the
/// explicit pre-checks still answers with the right status.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return ApiError::Conflict("A record with this value already exists.".to_string());
            }
        }
        ApiError::Database(err)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UploadFailed(_)
            | ApiError::MailFailed(_)
            | ApiError::Database(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self:?}");
        }

        // Driver detail never reaches the caller.
        let message = match &self {
            ApiError::Database(_) => "Internal server error.".to_string(),
            other => other.to_string(),
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}
