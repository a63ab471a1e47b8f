//! Booking wizard state machine.
//!
//! ```text
//! DateTime(1) --continue--> Details(2) --continue--> Payment(3) --submit--> Success(4)
//!      ^                        |   ^                     |
//!      +---------back-----------+   +--------back---------+
//! ```
//!
//! `continue` is gated on the active step's validation. `back` is allowed
//! from steps 2 and 3. Submission validates everything again, enters a
//! loading state, waits out a simulated payment round trip, then lands on
//! the success step with a [`BookingConfirmation`]. No payment processor is
//! called and no booking record is written.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::draft::{BookingDraft, ExperienceLevel, PaymentDetails};
use super::pricing::SessionDuration;
use super::slots::TimeSlot;
use super::validation::{validate_details, validate_payment, validate_schedule};
use crate::catalog::Expert;
use crate::error::{FieldError, FieldErrors};
use crate::types::Price;

/// Simulated payment round trip used when no delay is configured.
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_millis(1500);

/// Number of steps that collect input (the success screen is not counted).
pub const INPUT_STEPS: u8 = 3;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    DateTime,
    Details,
    Payment,
    Success,
}

impl BookingStep {
    /// 1-based step number.
    pub fn number(self) -> u8 {
        match self {
            Self::DateTime => 1,
            Self::Details => 2,
            Self::Payment => 3,
            Self::Success => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::DateTime => "Select date and time",
            Self::Details => "Session purpose & details",
            Self::Payment => "Payment & confirmation",
            Self::Success => "Booking confirmed",
        }
    }

    /// "Step n of 3" for the input steps, `None` on the success screen.
    pub fn progress_label(self) -> Option<String> {
        match self {
            Self::Success => None,
            step => Some(format!("Step {} of {INPUT_STEPS}", step.number())),
        }
    }

    /// Completion percentage for the progress bar.
    pub fn progress_percent(self) -> u8 {
        let done = self.number().min(INPUT_STEPS);
        (u16::from(done) * 100 / u16::from(INPUT_STEPS)) as u8
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("Invalid fields: {0}")]
    Invalid(FieldErrors),

    #[error("Already on the first step")]
    AtFirstStep,

    #[error("Payment step is the last input step; submit instead")]
    SubmitRequired,

    #[error("Payment can only be submitted from the payment step")]
    NotOnPaymentStep,

    #[error("Payment is already being processed")]
    Submitting,

    #[error("Booking is already confirmed")]
    Completed,
}

impl From<FieldErrors> for WizardError {
    fn from(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }
}

impl From<FieldError> for WizardError {
    fn from(error: FieldError) -> Self {
        Self::Invalid(error.into())
    }
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// What the success screen shows. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub expert_id: &'static str,
    pub expert_name: &'static str,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub duration: SessionDuration,
    pub price: Price,
}

impl BookingConfirmation {
    pub fn summary(&self) -> String {
        format!(
            "Your {} minute session with {} on {} at {} has been confirmed.",
            self.duration.minutes(),
            self.expert_name,
            self.date.format("%B %-d, %Y"),
            self.time
        )
    }
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

/// Wizard state for booking one expert.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    expert: &'static Expert,
    today: NaiveDate,
    step: BookingStep,
    draft: BookingDraft,
    submitting: bool,
    confirmation: Option<BookingConfirmation>,
}

impl BookingWizard {
    /// Open a fresh wizard with a default draft on step 1.
    pub fn new(expert: &'static Expert) -> Self {
        Self {
            expert,
            today: Utc::now().date_naive(),
            step: BookingStep::DateTime,
            draft: BookingDraft::default(),
            submitting: false,
            confirmation: None,
        }
    }

    /// Pin the first bookable date instead of reading the clock.
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn expert(&self) -> &'static Expert {
        self.expert
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.confirmation.as_ref()
    }

    /// Price for the selected duration, or the expert's listed price when
    /// no duration is selected.
    pub fn price(&self) -> Price {
        self.draft
            .duration
            .map(SessionDuration::price)
            .unwrap_or(self.expert.session.price)
    }

    // -- field updates --

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if date < self.today {
            return Err(FieldError::new("date", "Date cannot be in the past.").into());
        }
        self.draft.date = Some(date);
        Ok(())
    }

    /// Select a duration by minute code and return the new price.
    pub fn select_duration(&mut self, code: &str) -> Result<Price, WizardError> {
        self.ensure_editable()?;
        let duration = SessionDuration::from_code(code)?;
        self.draft.duration = Some(duration);
        Ok(self.price())
    }

    /// Select a time slot. Booked slots are refused and leave the current
    /// selection untouched.
    pub fn select_time(&mut self, slot: TimeSlot) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if slot.is_booked() {
            return Err(FieldError::new("time", format!("{slot} is already booked.")).into());
        }
        self.draft.time = Some(slot);
        Ok(())
    }

    pub fn select_time_label(&mut self, label: &str) -> Result<(), WizardError> {
        let slot = TimeSlot::parse(label)?;
        self.select_time(slot)
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.goal = goal.into();
        Ok(())
    }

    /// Add `topic` if absent, remove it if present. Only the expert's own
    /// expertise tags can be selected.
    pub fn toggle_topic(&mut self, topic: &str) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if let Some(pos) = self.draft.topics.iter().position(|t| t == topic) {
            self.draft.topics.remove(pos);
            return Ok(());
        }
        if !self.expert.has_expertise(topic) {
            return Err(FieldError::new(
                "topics",
                format!("'{topic}' is not one of this mentor's topics."),
            )
            .into());
        }
        self.draft.topics.push(topic.to_string());
        Ok(())
    }

    /// Replace the selected topics. Repeats collapse to their first
    /// occurrence; nothing changes if any topic is not offered.
    pub fn set_topics<S: AsRef<str>>(&mut self, topics: &[S]) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let mut next: Vec<String> = Vec::with_capacity(topics.len());
        for topic in topics.iter().map(AsRef::as_ref) {
            if next.iter().any(|t| t == topic) {
                continue;
            }
            if !self.expert.has_expertise(topic) {
                return Err(FieldError::new(
                    "topics",
                    format!("'{topic}' is not one of this mentor's topics."),
                )
                .into());
            }
            next.push(topic.to_string());
        }
        self.draft.topics = next;
        Ok(())
    }

    pub fn set_experience_level(
        &mut self,
        level: Option<ExperienceLevel>,
    ) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.experience_level = level;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.notes = notes.into();
        Ok(())
    }

    pub fn set_payment(&mut self, payment: PaymentDetails) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.payment = payment;
        Ok(())
    }

    pub fn set_agree_terms(&mut self, agree: bool) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.agree_terms = agree;
        Ok(())
    }

    // -- navigation --

    /// Check the fields owned by `step`.
    pub fn validate_step(&self, step: BookingStep) -> Result<(), FieldErrors> {
        match step {
            BookingStep::DateTime => validate_schedule(&self.draft, self.today),
            BookingStep::Details => validate_details(&self.draft, self.expert.expertise),
            BookingStep::Payment => validate_payment(&self.draft.payment, self.draft.agree_terms),
            BookingStep::Success => FieldErrors::new(),
        }
        .into_result()
    }

    /// Advance one step if the active step validates.
    pub fn continue_step(&mut self) -> Result<BookingStep, WizardError> {
        self.ensure_editable()?;
        let next = match self.step {
            BookingStep::DateTime => BookingStep::Details,
            BookingStep::Details => BookingStep::Payment,
            BookingStep::Payment => return Err(WizardError::SubmitRequired),
            BookingStep::Success => return Err(WizardError::Completed),
        };
        self.validate_step(self.step)?;
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Result<BookingStep, WizardError> {
        self.ensure_editable()?;
        let previous = match self.step {
            BookingStep::DateTime => return Err(WizardError::AtFirstStep),
            BookingStep::Details => BookingStep::DateTime,
            BookingStep::Payment => BookingStep::Details,
            BookingStep::Success => return Err(WizardError::Completed),
        };
        self.step = previous;
        Ok(previous)
    }

    // -- submission --

    /// Validate every step and enter the loading state.
    ///
    /// Split from [`complete_submit`](Self::complete_submit) so an owner that
    /// shares the wizard behind a lock can release it during the delay.
    pub fn begin_submit(&mut self) -> Result<(), WizardError> {
        match self.step {
            BookingStep::Payment => {}
            BookingStep::Success => return Err(WizardError::Completed),
            _ => return Err(WizardError::NotOnPaymentStep),
        }
        if self.submitting {
            return Err(WizardError::Submitting);
        }

        let mut errors = FieldErrors::new();
        for step in [BookingStep::DateTime, BookingStep::Details, BookingStep::Payment] {
            if let Err(step_errors) = self.validate_step(step) {
                for e in step_errors.iter() {
                    errors.push(e.field, e.message.clone());
                }
            }
        }
        errors.into_result()?;

        self.submitting = true;
        Ok(())
    }

    /// Finish a submission started with [`begin_submit`](Self::begin_submit).
    ///
    /// Moves to the success step and clears the draft; only the
    /// confirmation survives.
    pub fn complete_submit(&mut self) -> Result<BookingConfirmation, WizardError> {
        if !self.submitting {
            return Err(WizardError::NotOnPaymentStep);
        }
        let (Some(date), Some(time), Some(duration)) =
            (self.draft.date, self.draft.time, self.draft.duration)
        else {
            self.submitting = false;
            return Err(validate_schedule(&self.draft, self.today).into());
        };

        let confirmation = BookingConfirmation {
            expert_id: self.expert.id,
            expert_name: self.expert.name,
            date,
            time,
            duration,
            price: duration.price(),
        };

        self.submitting = false;
        self.draft = BookingDraft::default();
        self.step = BookingStep::Success;
        self.confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }

    /// Validate, wait out the simulated payment, and confirm.
    pub async fn submit(&mut self, delay: Duration) -> Result<BookingConfirmation, WizardError> {
        self.begin_submit()?;
        tokio::time::sleep(delay).await;
        self.complete_submit()
    }

    /// Back to a blank step 1.
    pub fn reset(&mut self) {
        self.step = BookingStep::DateTime;
        self.draft = BookingDraft::default();
        self.submitting = false;
        self.confirmation = None;
    }

    /// Dismiss the wizard. The draft is dropped; a confirmation, if one
    /// was reached, is handed back for the caller's records.
    pub fn close(self) -> Option<BookingConfirmation> {
        self.confirmation
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.step == BookingStep::Success {
            return Err(WizardError::Completed);
        }
        if self.submitting {
            return Err(WizardError::Submitting);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::pricing::DURATION_OPTIONS;
    use crate::catalog::find_expert;
    use assert_matches::assert_matches;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
    }

    fn wizard() -> BookingWizard {
        BookingWizard::new(find_expert("1").unwrap()).as_of(today())
    }

    fn fill_schedule(w: &mut BookingWizard) {
        w.select_date(today()).unwrap();
        w.select_time_label("11:00 AM").unwrap();
        w.select_duration("30").unwrap();
    }

    fn fill_details(w: &mut BookingWizard) {
        w.set_goal("I want guidance on scaling a React codebase").unwrap();
        w.toggle_topic("React").unwrap();
        w.set_experience_level(Some(ExperienceLevel::Intermediate)).unwrap();
    }

    fn fill_payment(w: &mut BookingWizard) {
        w.set_payment(PaymentDetails {
            card_name: "Ada Lovelace".into(),
            card_number: "4242424242424242".into(),
            expiry_date: "08/30".into(),
            cvv: "321".into(),
        })
        .unwrap();
        w.set_agree_terms(true).unwrap();
    }

    // -- steps --

    #[test]
    fn step_numbers_and_progress() {
        assert_eq!(BookingStep::DateTime.number(), 1);
        assert_eq!(BookingStep::Success.number(), 4);
        assert_eq!(BookingStep::DateTime.progress_percent(), 33);
        assert_eq!(BookingStep::Payment.progress_percent(), 100);
        assert_eq!(BookingStep::Success.progress_percent(), 100);
        assert_eq!(BookingStep::Details.progress_label().as_deref(), Some("Step 2 of 3"));
        assert!(BookingStep::Success.progress_label().is_none());
    }

    // -- pricing --

    #[test]
    fn price_follows_every_duration_change() {
        let mut w = wizard();
        assert_eq!(w.price(), 156);
        for option in DURATION_OPTIONS.iter().rev() {
            let price = w.select_duration(option.duration.code()).unwrap();
            assert_eq!(price, option.price);
            assert_eq!(w.price(), option.price);
        }
    }

    #[test]
    fn price_falls_back_to_listed_price_without_duration() {
        let mut w = wizard();
        w.draft.duration = None;
        assert_eq!(w.price(), w.expert().session.price);
    }

    #[test]
    fn invalid_duration_keeps_previous_selection() {
        let mut w = wizard();
        w.select_duration("45").unwrap();
        assert_matches!(w.select_duration("50"), Err(WizardError::Invalid(_)));
        assert_eq!(w.price(), 468);
    }

    // -- step 1 gating --

    #[test]
    fn continue_requires_date_time_and_duration() {
        let mut w = wizard();
        w.select_time_label("11:00 AM").unwrap();
        assert_matches!(w.continue_step(), Err(WizardError::Invalid(e)) if e.contains("date"));
        assert_eq!(w.step(), BookingStep::DateTime);

        let mut w = wizard();
        w.select_date(today()).unwrap();
        assert_matches!(w.continue_step(), Err(WizardError::Invalid(e)) if e.contains("time"));
        assert_eq!(w.step(), BookingStep::DateTime);

        let mut w = wizard();
        w.select_date(today()).unwrap();
        w.select_time_label("11:00 AM").unwrap();
        w.draft.duration = None;
        assert_matches!(w.continue_step(), Err(WizardError::Invalid(e)) if e.contains("duration"));
        assert_eq!(w.step(), BookingStep::DateTime);
    }

    #[test]
    fn booked_slot_cannot_become_selected() {
        let mut w = wizard();
        w.select_time_label("11:00 AM").unwrap();
        assert_matches!(w.select_time_label("10:30 AM"), Err(WizardError::Invalid(_)));
        assert_eq!(w.draft().time.map(|t| t.label()), Some("11:00 AM".to_string()));
    }

    #[test]
    fn past_date_rejected() {
        let mut w = wizard();
        assert_matches!(
            w.select_date(today().pred_opt().unwrap()),
            Err(WizardError::Invalid(_))
        );
        assert!(w.draft().date.is_none());
    }

    // -- step 2 gating --

    #[test]
    fn details_goal_boundary() {
        let mut w = wizard();
        fill_schedule(&mut w);
        w.continue_step().unwrap();

        w.set_goal("a".repeat(19)).unwrap();
        assert_matches!(w.continue_step(), Err(WizardError::Invalid(e)) if e.contains("goal"));
        assert_eq!(w.step(), BookingStep::Details);

        w.set_goal("a".repeat(20)).unwrap();
        assert_eq!(w.continue_step().unwrap(), BookingStep::Payment);
    }

    #[test]
    fn toggle_topic_adds_and_removes() {
        let mut w = wizard();
        w.toggle_topic("TypeScript").unwrap();
        assert_eq!(w.draft().topics, vec!["TypeScript".to_string()]);
        w.toggle_topic("TypeScript").unwrap();
        assert!(w.draft().topics.is_empty());
        assert_matches!(w.toggle_topic("Figma"), Err(WizardError::Invalid(_)));
    }

    #[test]
    fn set_topics_collapses_repeats() {
        let mut w = wizard();
        w.set_topics(&["React", "React", "TypeScript", "React"]).unwrap();
        assert_eq!(w.draft().topics, vec!["React", "TypeScript"]);

        assert_matches!(w.set_topics(&["React", "Figma"]), Err(WizardError::Invalid(_)));
        assert_eq!(w.draft().topics, vec!["React", "TypeScript"]);
    }

    // -- back --

    #[test]
    fn back_not_allowed_from_first_step() {
        let mut w = wizard();
        assert_matches!(w.back(), Err(WizardError::AtFirstStep));
    }

    #[test]
    fn back_keeps_entered_values() {
        let mut w = wizard();
        fill_schedule(&mut w);
        w.continue_step().unwrap();
        fill_details(&mut w);
        assert_eq!(w.back().unwrap(), BookingStep::DateTime);
        assert_eq!(w.draft().duration, Some(SessionDuration::Minutes30));
        assert!(!w.draft().goal.is_empty());
    }

    // -- submission --

    #[test]
    fn continue_on_payment_step_requires_submit() {
        let mut w = wizard();
        fill_schedule(&mut w);
        w.continue_step().unwrap();
        fill_details(&mut w);
        w.continue_step().unwrap();
        assert_matches!(w.continue_step(), Err(WizardError::SubmitRequired));
    }

    #[test]
    fn submit_outside_payment_step_rejected() {
        let mut w = wizard();
        assert_matches!(w.begin_submit(), Err(WizardError::NotOnPaymentStep));
    }

    #[test]
    fn submit_with_invalid_payment_stays_on_payment() {
        let mut w = wizard();
        fill_schedule(&mut w);
        w.continue_step().unwrap();
        fill_details(&mut w);
        w.continue_step().unwrap();
        fill_payment(&mut w);
        w.set_agree_terms(false).unwrap();
        assert_matches!(w.begin_submit(), Err(WizardError::Invalid(e)) if e.contains("agreeTerms"));
        assert_eq!(w.step(), BookingStep::Payment);
        assert!(!w.is_submitting());
    }

    #[test]
    fn edits_rejected_while_submitting() {
        let mut w = wizard();
        fill_schedule(&mut w);
        w.continue_step().unwrap();
        fill_details(&mut w);
        w.continue_step().unwrap();
        fill_payment(&mut w);
        w.begin_submit().unwrap();
        assert_matches!(w.begin_submit(), Err(WizardError::Submitting));
        assert_matches!(w.set_goal("changed my mind entirely here"), Err(WizardError::Submitting));
        assert_matches!(w.back(), Err(WizardError::Submitting));
    }

    #[tokio::test]
    async fn full_flow_reaches_success_and_clears_draft() {
        let mut w = wizard();
        fill_schedule(&mut w);
        w.continue_step().unwrap();
        fill_details(&mut w);
        w.continue_step().unwrap();
        fill_payment(&mut w);

        let confirmation = w.submit(Duration::from_millis(10)).await.unwrap();

        assert_eq!(w.step(), BookingStep::Success);
        assert_eq!(confirmation.price, 312);
        assert_eq!(confirmation.expert_id, "1");
        assert_eq!(confirmation.time.label(), "11:00 AM");
        assert_eq!(w.draft(), &BookingDraft::default());
        assert!(confirmation.summary().contains("30 minute session with IBRAHIM FONYUY"));
        assert_matches!(w.back(), Err(WizardError::Completed));

        // A new wizard for the same expert starts blank.
        let next = wizard();
        assert_eq!(next.step(), BookingStep::DateTime);
        assert_eq!(next.draft(), &BookingDraft::default());
    }

    #[test]
    fn reset_returns_to_blank_first_step() {
        let mut w = wizard();
        fill_schedule(&mut w);
        w.continue_step().unwrap();
        w.reset();
        assert_eq!(w.step(), BookingStep::DateTime);
        assert_eq!(w.draft(), &BookingDraft::default());
        assert!(w.confirmation().is_none());
    }
}
