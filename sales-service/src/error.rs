//! Error taxonomy for sales-service.

use service_core::error::AppError;
use thiserror::Error;

/// Failures returned by the lifecycle manager and the aggregator.
#[derive(Debug, Error)]
pub enum SalesError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Lost a conversion race, or the invoice was converted earlier.
    /// Callers should not alert on (or retry) this.
    #[error("invoice {0} already converted")]
    AlreadyConverted(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl SalesError {
    pub fn kind(&self) -> &'static str {
        match self {
            SalesError::NotFound(_) => "not_found",
            SalesError::InvalidState(_) => "invalid_state",
            SalesError::AlreadyConverted(_) => "already_converted",
            SalesError::Validation(_) => "validation",
            SalesError::Storage(_) => "storage",
        }
    }
}

impl From<SalesError> for AppError {
    fn from(err: SalesError) -> Self {
        match err {
            SalesError::NotFound(what) => AppError::NotFound(anyhow::anyhow!("{} not found", what)),
            SalesError::InvalidState(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            SalesError::AlreadyConverted(id) => {
                AppError::Conflict(anyhow::anyhow!("Invoice {} already converted", id))
            }
            SalesError::Validation(msg) => AppError::ValidationError(msg),
            SalesError::Storage(err) => AppError::DatabaseError(err),
        }
    }
}
