use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("No books found on this shelf")]
    EmptyShelf,

    #[error("This reader hasn't rated any books 5 stars yet")]
    NoFavorites,

    #[error("Model response did not match the expected shape: {0}")]
    Schema(String),

    #[error("Model output was cut off by the length limit")]
    ModelTruncated,

    #[error("Model returned no content")]
    ModelEmpty,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::EmptyShelf | AppError::NoFavorites => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Network(_)
            | AppError::ExternalApi(_)
            | AppError::Schema(_)
            | AppError::ModelTruncated
            | AppError::ModelEmpty => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
