//! Handlers for course progress and module completion.
//!
//! Every endpoint requires authentication via [`AuthUser`]; reads and
//! mutations are always scoped to `auth.user_id`.

use axum::extract::{Path, Query, State};
use axum::Json;
use coursetrack_core::completion::BatchCompletion;
use coursetrack_core::error::CoreError;
use coursetrack_core::progress::ProgressFilter;
use coursetrack_core::types::DbId;
use coursetrack_db::models::completion::CompletionChange;
use coursetrack_db::models::course::{CourseDetail, CourseProgress};
use coursetrack_db::repositories::{CompletionRepo, ProgressRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::CourseListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// GET /api/v1/courses
///
/// List all courses with the caller's progress, optionally filtered by
/// `?status=not_started|in_progress|completed`.
pub async fn list_courses(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CourseListParams>,
) -> AppResult<Json<DataResponse<Vec<CourseProgress>>>> {
    let filter = match params.status.as_deref() {
        Some(status) => ProgressFilter::from_str_value(status)?,
        None => ProgressFilter::All,
    };

    let courses = ProgressRepo::list_for_user(&state.pool, auth.user_id, filter).await?;

    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/{course_id}
///
/// A course with its modules in order, each annotated with the caller's
/// completion state.
pub async fn get_course(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseDetail>>> {
    let detail = ProgressRepo::find_detail(&state.pool, auth.user_id, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// POST /api/v1/courses/modules/{module_id}/complete
///
/// Idempotent: completing an already-complete module keeps its timestamp.
pub async fn mark_module_complete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(module_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CompletionChange>>> {
    let change = CompletionRepo::mark_complete(&state.pool, auth.user_id, module_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id: module_id,
        }))?;

    if change.changed {
        tracing::info!(user_id = auth.user_id, module_id, "Module marked complete");
    }

    Ok(Json(DataResponse { data: change }))
}

/// DELETE /api/v1/courses/modules/{module_id}/complete
///
/// Idempotent: succeeds whether or not a completion record existed.
pub async fn mark_module_incomplete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(module_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CompletionChange>>> {
    let change = CompletionRepo::mark_incomplete(&state.pool, auth.user_id, module_id).await?;

    if change.changed {
        tracing::info!(user_id = auth.user_id, module_id, "Module marked incomplete");
    }

    Ok(Json(DataResponse { data: change }))
}

/// POST /api/v1/courses/{course_id}/complete-all
///
/// Best-effort batch: modules that succeed stay complete even if others
/// fail, and any failure is reported as a retryable 503.
pub async fn mark_all_complete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<BatchCompletion>>> {
    let batch = CompletionRepo::mark_all_complete(&state.pool, auth.user_id, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course with modules",
            id: course_id,
        }))?;

    tracing::info!(
        user_id = auth.user_id,
        course_id,
        newly_completed = batch.newly_completed,
        already_completed = batch.already_completed,
        failed = batch.failed_module_ids.len(),
        "Mark-all-complete applied",
    );

    let batch = batch.into_result()?;

    Ok(Json(DataResponse { data: batch }))
}
