use crate::envelope::Envelope;
use crate::{error::AppError, AppState};
use axum::extract::State;
use std::sync::Arc;

// Request bodies are never read; every operation works on fixed names.

/// # POST /api/Create
pub async fn create(State(state): State<Arc<AppState>>) -> Result<Envelope, AppError> {
    state.service.create().await?;
    Ok(Envelope::success())
}

/// # GET /api/Read
/// The fetched rows go to the log only; the body is just the envelope.
pub async fn read(State(state): State<Arc<AppState>>) -> Result<Envelope, AppError> {
    state.service.read().await?;
    Ok(Envelope::success())
}

/// # POST /api/Update
pub async fn update(State(state): State<Arc<AppState>>) -> Result<Envelope, AppError> {
    state.service.update().await?;
    Ok(Envelope::success())
}

/// # POST /api/Delete
pub async fn delete(State(state): State<Arc<AppState>>) -> Result<Envelope, AppError> {
    state.service.delete().await?;
    Ok(Envelope::success())
}

/// # GET /api/VerifyFinalTreatments
pub async fn verify_final_treatments(
    State(state): State<Arc<AppState>>,
) -> Result<Envelope, AppError> {
    state.service.verify_final_treatments().await?;
    Ok(Envelope::success())
}
