//! Axum route handlers for the matching API.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::pipeline::run_match;
use crate::models::profile::MatchRequest;
use crate::models::run::MatchRun;
use crate::state::AppState;

/// POST /api/v1/match
///
/// Runs the full matching pipeline and returns the stored run.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchRun>, AppError> {
    if request.track.trim().is_empty() {
        return Err(AppError::Validation("track cannot be empty".to_string()));
    }

    let run = run_match(&state, request).await?;
    Ok(Json(run))
}

/// GET /api/v1/match/runs/:run_id
///
/// Returns a previously stored run, or 404 once the process has restarted or
/// the id is unknown.
pub async fn handle_get_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<MatchRun>, AppError> {
    state
        .runs
        .get(run_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("run {run_id} not found")))
}
