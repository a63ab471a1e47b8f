//! Per-step field validation for the booking wizard.
//!
//! Each function checks the fields owned by one step and reports every
//! failure at once, keyed by form field name.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::draft::{BookingDraft, PaymentDetails};
use crate::error::FieldErrors;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum goal length in characters.
pub const GOAL_MIN_CHARS: usize = 20;

/// Maximum goal length in characters.
pub const GOAL_MAX_CHARS: usize = 500;

/// Maximum length of the optional notes field.
pub const NOTES_MAX_CHARS: usize = 300;

/// Card numbers are exactly this many digits.
pub const CARD_NUMBER_DIGITS: usize = 16;

/// Expiry must be `MM/YY` with a real month.
pub const EXPIRY_PATTERN: &str = r"^(0[1-9]|1[0-2])/[0-9]{2}$";

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EXPIRY_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Step 1: date, time, duration
// ---------------------------------------------------------------------------

/// Validate the scheduling step. `today` is the first bookable date.
pub fn validate_schedule(draft: &BookingDraft, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match draft.date {
        None => errors.push("date", "A date is required."),
        Some(date) if date < today => errors.push("date", "Date cannot be in the past."),
        Some(_) => {}
    }

    match draft.time {
        None => errors.push("time", "A time is required."),
        Some(slot) if slot.is_booked() => {
            errors.push("time", format!("{slot} is already booked."))
        }
        Some(_) => {}
    }

    if draft.duration.is_none() {
        errors.push("duration", "Please select a duration.");
    }

    errors
}

// ---------------------------------------------------------------------------
// Step 2: session details
// ---------------------------------------------------------------------------

/// Validate the session-details step against the expert's expertise tags.
pub fn validate_details(draft: &BookingDraft, expertise: &[&str]) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let goal_len = draft.goal.chars().count();
    if goal_len < GOAL_MIN_CHARS {
        errors.push(
            "goal",
            format!("Please describe your goal in at least {GOAL_MIN_CHARS} characters."),
        );
    } else if goal_len > GOAL_MAX_CHARS {
        errors.push(
            "goal",
            format!("Goal must be at most {GOAL_MAX_CHARS} characters."),
        );
    }

    if let Some(topic) = draft
        .topics
        .iter()
        .find(|t| !expertise.contains(&t.as_str()))
    {
        errors.push(
            "topics",
            format!("'{topic}' is not one of this mentor's topics."),
        );
    }

    if draft.notes.chars().count() > NOTES_MAX_CHARS {
        errors.push(
            "notes",
            format!("Notes must be at most {NOTES_MAX_CHARS} characters."),
        );
    }

    errors
}

// ---------------------------------------------------------------------------
// Step 3: payment
// ---------------------------------------------------------------------------

/// Validate card details and the terms checkbox.
pub fn validate_payment(payment: &PaymentDetails, agree_terms: bool) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if payment.card_name.trim().is_empty() {
        errors.push("cardName", "Name on card is required.");
    }

    if !is_digits_of_len(&payment.card_number, CARD_NUMBER_DIGITS..=CARD_NUMBER_DIGITS) {
        errors.push(
            "cardNumber",
            format!("Card number must be {CARD_NUMBER_DIGITS} digits."),
        );
    }

    if !EXPIRY_RE.is_match(&payment.expiry_date) {
        errors.push("expiryDate", "Expiry must be MM/YY.");
    }

    if !is_digits_of_len(&payment.cvv, 3..=4) {
        errors.push("cvv", "CVV must be 3 or 4 digits.");
    }

    if !agree_terms {
        errors.push("agreeTerms", "You must agree to the terms.");
    }

    errors
}

fn is_digits_of_len(value: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
