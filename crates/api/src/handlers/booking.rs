//! Handlers for booking wizard sessions.
//!
//! A wizard is opened against an expert, filled in with partial updates,
//! walked forward with `continue` (gated on the active step's validation),
//! and finished with a simulated payment. Drafts are held in process memory
//! only; see [`BookingStore`](crate::booking_store::BookingStore).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use mentorhub_core::booking::{
    BookingConfirmation, BookingStep, BookingWizard, ExperienceLevel, SessionDuration, TimeSlot,
    WizardError,
};
use mentorhub_core::catalog;
use mentorhub_core::error::FieldErrors;
use mentorhub_core::types::Price;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Draft as echoed back to the client. The card number is masked and the
/// CVV is never returned.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    pub duration: Option<SessionDuration>,
    pub goal: String,
    pub topics: Vec<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub notes: String,
    pub card_name: String,
    pub card_number: String,
    pub expiry_date: String,
    pub agree_terms: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSnapshot {
    pub id: Uuid,
    pub expert_id: &'static str,
    pub expert_name: &'static str,
    pub step: BookingStep,
    pub step_number: u8,
    pub step_title: &'static str,
    /// "Step n of 3"; absent on the success step.
    pub progress: Option<String>,
    pub progress_percent: u8,
    pub submitting: bool,
    pub price: Price,
    pub draft: DraftView,
    pub confirmation: Option<BookingConfirmation>,
}

impl BookingSnapshot {
    fn of(id: Uuid, wizard: &BookingWizard) -> Self {
        let draft = wizard.draft();
        let step = wizard.step();
        Self {
            id,
            expert_id: wizard.expert().id,
            expert_name: wizard.expert().name,
            step,
            step_number: step.number(),
            step_title: step.title(),
            progress: step.progress_label(),
            progress_percent: step.progress_percent(),
            submitting: wizard.is_submitting(),
            price: wizard.price(),
            draft: DraftView {
                date: draft.date,
                time: draft.time,
                duration: draft.duration,
                goal: draft.goal.clone(),
                topics: draft.topics.clone(),
                experience_level: draft.experience_level,
                notes: draft.notes.clone(),
                card_name: draft.payment.card_name.clone(),
                card_number: draft.payment.masked_card_number(),
                expiry_date: draft.payment.expiry_date.clone(),
                agree_terms: draft.agree_terms,
            },
            confirmation: wizard.confirmation().cloned(),
        }
    }
}

/// Result of closing a wizard.
#[derive(Debug, Serialize)]
pub struct ClosedBooking {
    pub id: Uuid,
    pub confirmation: Option<BookingConfirmation>,
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

/// PATCH body. Absent fields are left as they are.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookingPatch {
    pub date: Option<NaiveDate>,
    /// Slot label, e.g. `"02:00 PM"`.
    pub time: Option<String>,
    /// Minute code, e.g. `"30"`.
    pub duration: Option<String>,
    pub goal: Option<String>,
    /// Full replacement of the selected topics. Repeats are collapsed.
    pub topics: Option<Vec<String>>,
    /// Absent leaves the level alone; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub experience_level: Option<Option<ExperienceLevel>>,
    pub notes: Option<String>,
    pub card_name: Option<String>,
    pub card_number: Option<String>,
    pub expiry_date: Option<String>,
    pub cvv: Option<String>,
    pub agree_terms: Option<bool>,
}

/// Marks a field as present even when its value is `null`, so
/// `Option<Option<T>>` can tell "absent" from "cleared".
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl BookingPatch {
    /// Apply every present field to a copy of `wizard` and commit only if
    /// all of them were accepted. Field errors from different fields are
    /// reported together.
    fn apply(self, wizard: &mut BookingWizard) -> Result<(), WizardError> {
        let mut next = wizard.clone();
        let mut errors = FieldErrors::new();

        let mut record = |result: Result<(), WizardError>| -> Result<(), WizardError> {
            match result {
                Ok(()) => Ok(()),
                Err(WizardError::Invalid(fields)) => {
                    for e in fields.iter() {
                        errors.push(e.field, e.message.clone());
                    }
                    Ok(())
                }
                Err(other) => Err(other),
            }
        };

        if let Some(date) = self.date {
            record(next.select_date(date))?;
        }
        if let Some(time) = self.time {
            record(next.select_time_label(&time))?;
        }
        if let Some(code) = self.duration {
            record(next.select_duration(&code).map(|_| ()))?;
        }
        if let Some(goal) = self.goal {
            record(next.set_goal(goal))?;
        }
        if let Some(topics) = self.topics {
            record(next.set_topics(topics.as_slice()))?;
        }
        if let Some(level) = self.experience_level {
            record(next.set_experience_level(level))?;
        }
        if let Some(notes) = self.notes {
            record(next.set_notes(notes))?;
        }

        let mut payment = next.draft().payment.clone();
        let mut payment_changed = false;
        for (slot, value) in [
            (&mut payment.card_name, self.card_name),
            (&mut payment.card_number, self.card_number),
            (&mut payment.expiry_date, self.expiry_date),
            (&mut payment.cvv, self.cvv),
        ] {
            if let Some(value) = value {
                *slot = value;
                payment_changed = true;
            }
        }
        if payment_changed {
            record(next.set_payment(payment))?;
        }
        if let Some(agree) = self.agree_terms {
            record(next.set_agree_terms(agree))?;
        }

        errors.into_result()?;
        *wizard = next;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/experts/{id}/bookings
pub async fn open_booking(
    State(state): State<AppState>,
    Path(expert_id): Path<String>,
) -> AppResult<(StatusCode, Json<DataResponse<BookingSnapshot>>)> {
    let expert = catalog::find_expert(&expert_id)?;
    let id = state.bookings.open(expert).await;
    let snapshot = state
        .bookings
        .read(id, |w| BookingSnapshot::of(id, w))
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: snapshot })))
}

/// GET /api/v1/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<BookingSnapshot>>> {
    let snapshot = state
        .bookings
        .read(id, |w| BookingSnapshot::of(id, w))
        .await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// PATCH /api/v1/bookings/{id}
///
/// Returns 422 with every rejected field; nothing is applied in that case.
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<BookingPatch>,
) -> AppResult<Json<DataResponse<BookingSnapshot>>> {
    let snapshot = state
        .bookings
        .update(id, |w| {
            patch.apply(w)?;
            Ok(BookingSnapshot::of(id, w))
        })
        .await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// POST /api/v1/bookings/{id}/continue
pub async fn continue_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<BookingSnapshot>>> {
    let snapshot = state
        .bookings
        .update(id, |w| {
            w.continue_step()?;
            Ok(BookingSnapshot::of(id, w))
        })
        .await?;
    tracing::debug!(booking_id = %id, step = snapshot.step_number, "Booking advanced");
    Ok(Json(DataResponse { data: snapshot }))
}

/// POST /api/v1/bookings/{id}/back
pub async fn back_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<BookingSnapshot>>> {
    let snapshot = state
        .bookings
        .update(id, |w| {
            w.back()?;
            Ok(BookingSnapshot::of(id, w))
        })
        .await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// POST /api/v1/bookings/{id}/submit
///
/// Waits out the configured payment delay, then returns the wizard on the
/// success step.
pub async fn submit_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<BookingSnapshot>>> {
    state.bookings.submit(id).await?;
    let snapshot = state
        .bookings
        .read(id, |w| BookingSnapshot::of(id, w))
        .await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// DELETE /api/v1/bookings/{id}
pub async fn close_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<ClosedBooking>>> {
    let confirmation = state.bookings.close(id).await?;
    Ok(Json(DataResponse {
        data: ClosedBooking { id, confirmation },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn wizard() -> BookingWizard {
        let expert = catalog::find_expert("1").unwrap();
        BookingWizard::new(expert).as_of(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn patch_is_all_or_nothing() {
        let mut w = wizard();
        let patch = BookingPatch {
            date: NaiveDate::from_ymd_opt(2024, 2, 1),
            time: Some("10:30 AM".into()),
            duration: Some("90".into()),
            ..Default::default()
        };

        let err = patch.apply(&mut w).unwrap_err();
        assert_matches!(err, WizardError::Invalid(ref fields) if fields.len() == 2);
        assert_eq!(w.draft().date, None);
    }

    #[test]
    fn patch_replaces_topics() {
        let mut w = wizard();
        w.toggle_topic("React").unwrap();
        let patch = BookingPatch {
            topics: Some(vec!["TypeScript".into(), "Node.js".into()]),
            ..Default::default()
        };
        patch.apply(&mut w).unwrap();
        assert_eq!(w.draft().topics, vec!["TypeScript", "Node.js"]);
    }

    #[test]
    fn patch_with_repeated_topic_selects_it_once() {
        let mut w = wizard();
        let patch: BookingPatch =
            serde_json::from_value(serde_json::json!({ "topics": ["React", "React"] })).unwrap();
        patch.apply(&mut w).unwrap();
        assert_eq!(w.draft().topics, vec!["React"]);
    }

    #[test]
    fn null_experience_level_clears_it() {
        let mut w = wizard();
        w.set_experience_level(Some(ExperienceLevel::Advanced)).unwrap();

        let absent: BookingPatch =
            serde_json::from_value(serde_json::json!({ "notes": "hi" })).unwrap();
        assert_eq!(absent.experience_level, None);
        absent.apply(&mut w).unwrap();
        assert_eq!(w.draft().experience_level, Some(ExperienceLevel::Advanced));

        let cleared: BookingPatch =
            serde_json::from_value(serde_json::json!({ "experienceLevel": null })).unwrap();
        assert_eq!(cleared.experience_level, Some(None));
        cleared.apply(&mut w).unwrap();
        assert_eq!(w.draft().experience_level, None);
    }

    #[test]
    fn patch_merges_payment_fields() {
        let mut w = wizard();
        BookingPatch {
            card_name: Some("Ada".into()),
            ..Default::default()
        }
        .apply(&mut w)
        .unwrap();
        BookingPatch {
            cvv: Some("123".into()),
            ..Default::default()
        }
        .apply(&mut w)
        .unwrap();
        assert_eq!(w.draft().payment.card_name, "Ada");
        assert_eq!(w.draft().payment.cvv, "123");
    }

    #[test]
    fn snapshot_masks_card_number() {
        let mut w = wizard();
        BookingPatch {
            card_number: Some("4242424242424242".into()),
            ..Default::default()
        }
        .apply(&mut w)
        .unwrap();
        let snapshot = BookingSnapshot::of(Uuid::new_v4(), &w);
        assert_eq!(snapshot.draft.card_number, "************4242");
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["draft"].get("cvv").is_none());
        assert_eq!(json["progress"], "Step 1 of 3");
    }
}
