//! Bookable time slots.
//!
//! The slot list and the booked subset are both static. New bookings do
//! not mark slots as taken.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FieldError;

const SLOT_FORMAT: &str = "%I:%M %p";

/// Slots offered every day, in display order.
pub const AVAILABLE_TIMES: [&str; 8] = [
    "10:00 AM", "10:15 AM", "10:30 AM", "11:00 AM", "11:30 AM", "02:00 PM", "02:30 PM", "03:00 PM",
];

/// Slots shown as unavailable.
pub const BOOKED_TIMES: [&str; 2] = ["10:30 AM", "02:30 PM"];

/// A start time from [`AVAILABLE_TIMES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    /// Parse a slot label like `"02:00 PM"`. Only offered slots parse.
    pub fn parse(label: &str) -> Result<Self, FieldError> {
        let time = NaiveTime::parse_from_str(label.trim(), SLOT_FORMAT)
            .map_err(|_| FieldError::new("time", format!("Invalid time '{label}'")))?;
        let slot = Self(time);
        if !AVAILABLE_TIMES.iter().any(|t| *t == slot.label()) {
            return Err(FieldError::new(
                "time",
                format!("{label} is not an offered time slot"),
            ));
        }
        Ok(slot)
    }

    pub fn label(&self) -> String {
        self.0.format(SLOT_FORMAT).to_string()
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn is_booked(&self) -> bool {
        let label = self.label();
        BOOKED_TIMES.iter().any(|t| *t == label)
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        TimeSlot::parse(&label).map_err(|e| serde::de::Error::custom(e.message))
    }
}

/// A slot paired with whether it can be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub slot: TimeSlot,
    pub booked: bool,
}

/// Every offered slot with its booked flag.
pub fn time_slots() -> Vec<SlotAvailability> {
    AVAILABLE_TIMES
        .iter()
        .filter_map(|label| TimeSlot::parse(label).ok())
        .map(|slot| SlotAvailability {
            slot,
            booked: slot.is_booked(),
        })
        .collect()
}
