//! Error types for the KAPDESK system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KapdeskError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// Note attribution failed: the authoring user is gone.
    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Invalid status: {value}")]
    InvalidStatus { value: String },

    #[error("Scheduled tickets require a scheduled date")]
    ScheduledDateRequired,

    #[error("Invalid role: {role}")]
    InvalidRole { role: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type KapdeskResult<T> = Result<T, KapdeskError>;
