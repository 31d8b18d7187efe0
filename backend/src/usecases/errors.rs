use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{0}")]
    Conflict(String),
    #[error("payment provider error: {0}")]
    ExternalProvider(String),
    #[error("invalid webhook signature")]
    SignatureVerification,
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UseCaseError::Validation(_)
            | UseCaseError::PreconditionFailed(_)
            | UseCaseError::SignatureVerification
            | UseCaseError::InvalidWebhook(_) => StatusCode::BAD_REQUEST,
            UseCaseError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            UseCaseError::Forbidden(_) => StatusCode::FORBIDDEN,
            UseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UseCaseError::Conflict(_) => StatusCode::CONFLICT,
            UseCaseError::ExternalProvider(_) | UseCaseError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to the caller. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            UseCaseError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UseCaseError>;
