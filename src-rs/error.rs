use axum::http::StatusCode;
use thiserror::Error;

use crate::llm::GenerationError;
use crate::task::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Generation(GenerationError),

    #[error(transparent)]
    Storage(StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingApiKey | GenerationError::ClientSetup(_) => {
                ApiError::Configuration(err.to_string())
            }
            other => ApiError::Generation(other),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound(err.to_string()),
            StoreError::InvalidId(_) => ApiError::Validation(err.to_string()),
            StoreError::UnsupportedUrl(_) => ApiError::Configuration(err.to_string()),
            other => ApiError::Storage(other),
        }
    }
}
