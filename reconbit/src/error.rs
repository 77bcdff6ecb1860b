use crate::record::DetailId;
use axum::extract::rejection::JsonRejection;
use config::ConfigError;
use http::StatusCode;
use thiserror::Error;

/// Coarse classification callers use to decide between rollback-and-report and rollback-and-retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ConstraintViolation,
    Validation,
    Connection,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("Encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("serde error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json rejection: {0}")]
    JsonRejection(#[from] JsonRejection),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Detail {0} submitted more than once")]
    DuplicateDetail(DetailId),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            AppError::Validation(_)
            | AppError::DuplicateDetail(_)
            | AppError::BadRequest(_)
            | AppError::JsonRejection(_)
            | AppError::SerdeError(_) => ErrorKind::Validation,
            AppError::Database(_)
            | AppError::Redb(_)
            | AppError::RedbTransaction(_)
            | AppError::RedbStorage(_)
            | AppError::RedbTable(_)
            | AppError::RedbCommit(_)
            | AppError::Io(_) => ErrorKind::Connection,
            _ => ErrorKind::Internal,
        }
    }

    /// Only connection-class failures may be retried, and only by re-running the whole operation.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::JsonRejection(r) => r.status(),
            AppError::BadRequest(_)    => StatusCode::BAD_REQUEST,
            other => match other.kind() {
                ErrorKind::NotFound            => StatusCode::NOT_FOUND,
                ErrorKind::ConstraintViolation => StatusCode::CONFLICT,
                ErrorKind::Validation          => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Connection          => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Internal            => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<AppError> for axum::Error {
    fn from(val: AppError) -> Self {
        axum::Error::new(val.to_string())
    }
}
