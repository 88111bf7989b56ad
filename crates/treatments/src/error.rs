use database::DbError;
use thiserror::Error;

/// Failures of a service operation.
///
/// Callers over HTTP only ever see a single "operation failed" result; the
/// variants exist so logs can tell the causes apart.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Store unavailable: {0}")]
    ConnectionFailure(String),

    #[error("Database error: {0}")]
    Store(DbError),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(message) => ServiceError::NotFound(message),
            DbError::ConstraintViolation(message) => ServiceError::ConstraintViolation(message),
            DbError::ConnectionFailure(message) => ServiceError::ConnectionFailure(message),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    /// Short, stable label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::ConstraintViolation(_) => "constraint_violation",
            ServiceError::ConnectionFailure(_) => "connection_failure",
            ServiceError::Store(_) => "store",
        }
    }
}
