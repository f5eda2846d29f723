//! Error types for the Counsel system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CounselError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Authorization failed: {reason}")]
    Unauthorized { reason: String },

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("Meeting provider error: {0}")]
    MeetingProvider(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CounselError {
    /// HTTP status the transport layer should answer with.
    ///
    /// Validation and business conflicts are client errors; upstream
    /// provider and storage failures are server errors.
    pub fn status_code(&self) -> u16 {
        match self {
            CounselError::NotFound { .. } => 404,
            CounselError::Validation { .. } | CounselError::Conflict { .. } => 400,
            CounselError::Unauthorized { .. } => 401,
            CounselError::PaymentGateway(_)
            | CounselError::MeetingProvider(_)
            | CounselError::Database(_)
            | CounselError::Internal(_) => 500,
        }
    }
}

pub type CounselResult<T> = Result<T, CounselError>;
