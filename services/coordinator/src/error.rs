//! Custom error types for the coordination service

use common::error::DatabaseError;
use thiserror::Error;

/// Outcome of a failed application service call
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The referenced row does not exist
    #[error("{entity} {key} does not exist")]
    NotFound { entity: &'static str, key: String },

    /// A cross-entity rule or database constraint rejected the change
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Operator input failed a presence check or could not be parsed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The store could not be reached or rejected the statement
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] DatabaseError),
}

impl ServiceError {
    pub fn user_not_found(id: i64) -> Self {
        ServiceError::NotFound {
            entity: "User",
            key: format!("id {}", id),
        }
    }

    pub fn event_not_found(id: i64) -> Self {
        ServiceError::NotFound {
            entity: "Event",
            key: format!("id {}", id),
        }
    }

    pub fn registration_not_found(user_id: i64, event_id: i64) -> Self {
        ServiceError::NotFound {
            entity: "Registration",
            key: format!("of user id {} for event id {}", user_id, event_id),
        }
    }

    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_foreign_key_violation() || db.is_unique_violation() => {
                ServiceError::ConstraintViolation(db.message().to_string())
            }
            _ => ServiceError::StorageUnavailable(err),
        }
    }
}

/// Type alias for service results
pub type ServiceResult<T> = Result<T, ServiceError>;
