use crate::envelope::Envelope;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use treatments::ServiceError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Operation failed: {0}")]
    Service(#[from] ServiceError),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Every failure maps to the same error envelope and a 500. The cause is
/// only visible in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Service(err) = self;
        match &err {
            ServiceError::NotFound(detail) => {
                tracing::error!(kind = err.kind(), detail = %detail, "Requested association does not exist.");
            }
            ServiceError::ConstraintViolation(detail) => {
                tracing::error!(kind = err.kind(), detail = %detail, "Store rejected the change.");
            }
            ServiceError::ConnectionFailure(detail) => {
                tracing::error!(kind = err.kind(), detail = %detail, "Store unavailable.");
            }
            ServiceError::Store(db_err) => {
                tracing::error!(kind = err.kind(), error = ?db_err, "Database error.");
            }
        }
        Envelope::error().into_response()
    }
}
