//! Handler for the AI task review action.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use mentorhub_ai::{ReviewForm, ReviewOutcome};
use mentorhub_core::catalog;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/tasks/{id}/review
///
/// Behaves like a form action: every outcome, including an unreadable body
/// or a failed model call, is a 200 carrying a [`ReviewOutcome`]. Only an
/// unknown task id is an error. The task's course supplies the review
/// context.
pub async fn review_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ReviewForm>, JsonRejection>,
) -> AppResult<Json<ReviewOutcome>> {
    let task = catalog::find_task(&id)?;

    let form = match body {
        Ok(Json(form)) => form,
        Err(rejection) => {
            tracing::debug!(task_id = %id, error = %rejection, "Unreadable review form");
            ReviewForm::default()
        }
    };

    tracing::info!(task_id = %id, "Task submitted for AI review");
    let outcome = state
        .reviewer
        .submit_for_review(form, Some(task.review_context()))
        .await;
    Ok(Json(outcome))
}
