use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Could not reach the database: {0}")]
    ConnectionFailure(String),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Query failed: {0}")]
    QueryError(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(message) = constraint_message(&err) {
            return DbError::ConstraintViolation(message);
        }
        if is_connection_failure(&err) {
            return DbError::ConnectionFailure(err.to_string());
        }
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound("no matching row".to_string()),
            other => DbError::QueryError(other),
        }
    }
}

fn constraint_message(err: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    match db_err.kind() {
        ErrorKind::UniqueViolation
        | ErrorKind::ForeignKeyViolation
        | ErrorKind::NotNullViolation
        | ErrorKind::CheckViolation => Some(db_err.message().to_string()),
        _ => None,
    }
}

fn is_connection_failure(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}
