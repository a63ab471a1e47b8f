//! Booking wizard for paid mentorship sessions.
//!
//! A four-step linear flow (date/time/duration, session details, payment,
//! success) that collects an ephemeral [`BookingDraft`], gates each step on
//! field validation, derives the price from a static duration table, and
//! simulates a payment round trip. Nothing here persists a booking.

pub mod draft;
pub mod pricing;
pub mod slots;
pub mod validation;
pub mod wizard;

pub use draft::{BookingDraft, ExperienceLevel, PaymentDetails};
pub use pricing::{DurationOption, SessionDuration, DURATION_OPTIONS};
pub use slots::{time_slots, SlotAvailability, TimeSlot};
pub use wizard::{
    BookingConfirmation, BookingStep, BookingWizard, WizardError, DEFAULT_PAYMENT_DELAY,
};
