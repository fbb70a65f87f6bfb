use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// Input that violates a domain rule (rating range, date bounds, required fields).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("diary entry {0} not found")]
    NotFound(i32),

    #[error("storage unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },

    #[error("migration {version} ({name}) failed: {source}")]
    Migration {
        version: i64,
        name: String,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("invalid row: {0}")]
    InvalidRow(String),

    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors at the HTTP boundary. Internal details are logged, never rendered.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Maps a storage failure for `op` on `entry_id`, logging it with that context.
    pub fn from_store(op: &'static str, entry_id: Option<i32>, err: StoreError) -> Self {
        match err {
            StoreError::Validation(v) => {
                tracing::info!(op, entry_id, reason = %v, "rejected invalid input");
                Self::BadRequest(v.to_string())
            },
            StoreError::NotFound(id) => {
                tracing::info!(op, entry_id = id, "entry not found");
                Self::NotFound("Entry not found".to_string())
            },
            other => {
                tracing::error!(op, entry_id, error = %other, "storage failure");
                Self::Internal(anyhow::Error::new(other))
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                "Something went wrong".to_string()
            },
            other => other.to_string(),
        };
        (status, Html(crate::templates::error_fragment(status, &message))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_status_codes() {
        let validation = StoreError::Validation(ValidationError::new("rating must be 1-5"));
        assert_eq!(AppError::from_store("create", None, validation).status(), StatusCode::BAD_REQUEST);

        let missing = StoreError::NotFound(7);
        assert_eq!(AppError::from_store("get", Some(7), missing).status(), StatusCode::NOT_FOUND);

        let db = StoreError::Database(sea_orm::DbErr::Custom("disk I/O error".into()));
        assert_eq!(
            AppError::from_store("get", Some(7), db).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let err = AppError::from_store(
            "list",
            None,
            StoreError::Database(sea_orm::DbErr::Custom("secret table layout".into())),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("secret table layout"));
        assert!(body.contains("Something went wrong"));
    }
}
