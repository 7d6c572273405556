//! Axum route handlers for resume CRUD.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::{AppError, AppJson};
use crate::models::resume::{NewResume, ResumePatch, ResumeRecord};
use crate::routes::parse_resume_id;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// POST /api/resumes
pub async fn handle_create(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewResume>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    body.validate()?;
    let record = state.store.create(body).await?;
    info!(resume_id = %record.id, "resume created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/resumes
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeRecord>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// GET /api/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeRecord>, AppError> {
    let id = parse_resume_id(&id)?;
    let record = state
        .store
        .fetch_by_id(id)
        .await?
        .ok_or_else(AppError::resume_not_found)?;
    Ok(Json(record))
}

/// PUT /api/resumes/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<ResumePatch>,
) -> Result<Json<ResumeRecord>, AppError> {
    let id = parse_resume_id(&id)?;
    patch.validate()?;
    let record = state
        .store
        .update(id, patch)
        .await?
        .ok_or_else(AppError::resume_not_found)?;
    info!(resume_id = %record.id, "resume updated");
    Ok(Json(record))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_resume_id(&id)?;
    state
        .store
        .delete(id)
        .await?
        .ok_or_else(AppError::resume_not_found)?;
    info!(resume_id = %id, "resume deleted");
    Ok(Json(DeleteResponse {
        message: "Resume deleted",
    }))
}
