// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan schedule and operation routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    ApplyResult, Operation, OperationPreview, ScheduleSnapshot, TrainingPlan, ValidationResult,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Largest batch accepted in one request.
pub const MAX_BATCH_SIZE: u64 = 50;

/// Plan routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/plans/{plan_id}/schedule", get(get_schedule))
        .route(
            "/api/plans/{plan_id}/operations/validate",
            post(validate_batch),
        )
        .route(
            "/api/plans/{plan_id}/operations/preview",
            post(preview_batch),
        )
        .route("/api/plans/{plan_id}/operations/apply", post(apply_batch))
}

/// Request body shared by the operation endpoints.
#[derive(Debug, Deserialize, Validate)]
pub struct OperationsRequest {
    #[validate(length(max = MAX_BATCH_SIZE))]
    pub operations: Vec<Operation>,
}

/// Preview response: the validation outcome plus, when valid, one preview per operation.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PreviewResponse {
    pub validation: ValidationResult,
    pub previews: Vec<OperationPreview>,
}

/// Load a plan and check the caller owns it.
async fn load_owned_plan(state: &AppState, plan_id: &str, user: &AuthUser) -> Result<TrainingPlan> {
    let plan = state
        .engine
        .store()
        .get_plan(plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Plan {}", plan_id)))?;

    if plan.owner_id != user.user_id {
        tracing::warn!(
            plan_id,
            user_id = %user.user_id,
            "Rejected access to plan owned by another user"
        );
        return Err(AppError::Forbidden);
    }

    Ok(plan)
}

fn check_request(request: &OperationsRequest) -> Result<()> {
    request.validate().map_err(|e| {
        AppError::BadRequest(format!(
            "a batch may contain at most {} operations ({})",
            MAX_BATCH_SIZE, e
        ))
    })
}

// ─── Schedule ────────────────────────────────────────────────

/// Current schedule snapshot.
async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(plan_id): Path<String>,
) -> Result<Json<ScheduleSnapshot>> {
    load_owned_plan(&state, &plan_id, &user).await?;
    Ok(Json(state.engine.snapshot(&plan_id).await?))
}

// ─── Operations ──────────────────────────────────────────────

async fn validate_batch(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(plan_id): Path<String>,
    Json(request): Json<OperationsRequest>,
) -> Result<Json<ValidationResult>> {
    check_request(&request)?;
    load_owned_plan(&state, &plan_id, &user).await?;

    let snapshot = state.engine.snapshot(&plan_id).await?;
    Ok(Json(state.engine.validate(&request.operations, &snapshot)))
}

async fn preview_batch(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(plan_id): Path<String>,
    Json(request): Json<OperationsRequest>,
) -> Result<Json<PreviewResponse>> {
    check_request(&request)?;
    load_owned_plan(&state, &plan_id, &user).await?;

    let snapshot = state.engine.snapshot(&plan_id).await?;
    let (validation, previews) = state.engine.preview(&request.operations, &snapshot);

    tracing::debug!(
        plan_id = %plan_id,
        operations = request.operations.len(),
        valid = validation.valid,
        "Previewed batch"
    );

    Ok(Json(PreviewResponse {
        validation,
        previews,
    }))
}

async fn apply_batch(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(plan_id): Path<String>,
    Json(request): Json<OperationsRequest>,
) -> Result<Json<ApplyResult>> {
    check_request(&request)?;
    load_owned_plan(&state, &plan_id, &user).await?;
    state.rate_limiter.check(&user.user_id)?;

    tracing::info!(
        plan_id = %plan_id,
        user_id = %user.user_id,
        operations = request.operations.len(),
        "Applying batch"
    );

    let result = state.engine.apply(&plan_id, &request.operations).await?;
    Ok(Json(result))
}
