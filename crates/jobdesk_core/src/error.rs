//! Application error types for storage and listing logic.
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::Database(value.into())
    }
}

/// Cloneable error classification stored in listing state and shown to
/// consumers. Read failures classify as `Query`, mutation failures as
/// `Write`; missing records classify as `NotFound` in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Query(String),
    Write(String),
    NotFound,
}

impl ErrorKind {
    pub(crate) fn read(err: &AppError) -> Self {
        match err {
            AppError::NotFound => Self::NotFound,
            other => Self::Query(other.to_string()),
        }
    }

    pub(crate) fn write(err: &AppError) -> Self {
        match err {
            AppError::NotFound => Self::NotFound,
            other => Self::Write(other.to_string()),
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query(msg) => write!(f, "query failed: {msg}"),
            Self::Write(msg) => write!(f, "write failed: {msg}"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}
