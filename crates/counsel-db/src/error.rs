//! Database-specific error types and conversions.

use counsel_core::error::CounselError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Malformed row: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for CounselError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CounselError::NotFound { entity, id },
            other => CounselError::Database(other.to_string()),
        }
    }
}
