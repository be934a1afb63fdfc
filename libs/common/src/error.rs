//! Custom error types for the common library
//!
//! This module defines the storage error type shared by every component that
//! talks to the relational store.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred while establishing or acquiring a connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify a driver error raised while running a statement.
    ///
    /// Pool and I/O failures surface as `Connection` so callers can tell an
    /// unreachable store apart from a rejected statement.
    pub fn from_query(err: SqlxError) -> Self {
        match err {
            SqlxError::PoolTimedOut
            | SqlxError::PoolClosed
            | SqlxError::Io(_)
            | SqlxError::Tls(_)
            | SqlxError::WorkerCrashed => DatabaseError::Connection(err),
            other => DatabaseError::Query(other),
        }
    }

    /// The underlying database error, when the server rejected the statement.
    pub fn as_database_error(&self) -> Option<&(dyn sqlx::error::DatabaseError + 'static)> {
        match self {
            DatabaseError::Query(SqlxError::Database(db)) => Some(db.as_ref()),
            _ => None,
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
