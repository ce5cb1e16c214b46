//! Database-specific error types and conversions.

use kapdesk_core::error::KapdeskError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for KapdeskError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => KapdeskError::NotFound { entity, id },
            other => KapdeskError::Database(other.to_string()),
        }
    }
}
