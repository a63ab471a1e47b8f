//! Handlers for the read-only seed catalog: experts, courses, tasks, and
//! scheduled sessions.

use axum::extract::{Path, Query};
use axum::Json;
use mentorhub_core::booking::{time_slots, DurationOption, SlotAvailability, DURATION_OPTIONS};
use mentorhub_core::catalog::{self, Course, Expert, MentorSession, SessionOffer, Task};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;

/// Query parameters for the expert listing.
#[derive(Debug, Deserialize)]
pub struct ExpertQuery {
    /// Case-insensitive expertise filter (e.g. "react").
    pub expertise: Option<String>,
}

/// Query parameters for the session listing.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    /// Only `upcoming` is recognised.
    pub status: Option<String>,
}

/// What can be booked with one expert.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub expert_id: &'static str,
    /// Price shown before a duration is chosen.
    pub listed: SessionOffer,
    pub durations: Vec<DurationOption>,
    pub slots: Vec<SlotAvailability>,
}

/// GET /api/v1/experts
pub async fn list_experts(
    Query(params): Query<ExpertQuery>,
) -> Json<DataResponse<Vec<&'static Expert>>> {
    let experts = match params.expertise.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => catalog::experts_with_expertise(q),
        _ => catalog::experts().iter().collect(),
    };
    Json(DataResponse { data: experts })
}

/// GET /api/v1/experts/{id}
pub async fn get_expert(Path(id): Path<String>) -> AppResult<Json<DataResponse<&'static Expert>>> {
    let expert = catalog::find_expert(&id)?;
    Ok(Json(DataResponse { data: expert }))
}

/// GET /api/v1/experts/{id}/availability
///
/// Duration price table and the day's slots with their booked flag. The
/// booked set is static.
pub async fn get_availability(
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Availability>>> {
    let expert = catalog::find_expert(&id)?;
    Ok(Json(DataResponse {
        data: Availability {
            expert_id: expert.id,
            listed: expert.session,
            durations: DURATION_OPTIONS.to_vec(),
            slots: time_slots(),
        },
    }))
}

/// GET /api/v1/courses
pub async fn list_courses() -> Json<DataResponse<&'static [Course]>> {
    Json(DataResponse {
        data: catalog::courses(),
    })
}

/// GET /api/v1/tasks
pub async fn list_tasks() -> Json<DataResponse<&'static [Task]>> {
    Json(DataResponse {
        data: catalog::tasks(),
    })
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(Path(id): Path<String>) -> AppResult<Json<DataResponse<&'static Task>>> {
    let task = catalog::find_task(&id)?;
    Ok(Json(DataResponse { data: task }))
}

/// GET /api/v1/sessions
pub async fn list_sessions(
    Query(params): Query<SessionQuery>,
) -> AppResult<Json<DataResponse<Vec<&'static MentorSession>>>> {
    let sessions = match params.status.as_deref() {
        None => catalog::sessions().iter().collect(),
        Some("upcoming") => catalog::upcoming_sessions(),
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unknown session status '{other}'. Supported: upcoming"
            )))
        }
    };
    Ok(Json(DataResponse { data: sessions }))
}
