//! Fixed duration-to-price table.

use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::types::Price;

/// Session lengths a student can book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionDuration {
    #[serde(rename = "15")]
    Minutes15,
    #[serde(rename = "30")]
    Minutes30,
    #[serde(rename = "45")]
    Minutes45,
    #[serde(rename = "60")]
    Minutes60,
}

/// One row of the price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationOption {
    pub duration: SessionDuration,
    pub minutes: u32,
    pub price: Price,
}

/// Price table, ordered shortest first.
pub const DURATION_OPTIONS: [DurationOption; 4] = [
    DurationOption {
        duration: SessionDuration::Minutes15,
        minutes: 15,
        price: 156,
    },
    DurationOption {
        duration: SessionDuration::Minutes30,
        minutes: 30,
        price: 312,
    },
    DurationOption {
        duration: SessionDuration::Minutes45,
        minutes: 45,
        price: 468,
    },
    DurationOption {
        duration: SessionDuration::Minutes60,
        minutes: 60,
        price: 624,
    },
];

impl SessionDuration {
    /// Parse a minute code such as `"30"`.
    pub fn from_code(code: &str) -> Result<Self, FieldError> {
        DURATION_OPTIONS
            .iter()
            .find(|o| o.minutes.to_string() == code.trim())
            .map(|o| o.duration)
            .ok_or_else(|| {
                FieldError::new(
                    "duration",
                    format!("Invalid duration '{code}'. Must be one of: 15, 30, 45, 60"),
                )
            })
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Minutes15 => "15",
            Self::Minutes30 => "30",
            Self::Minutes45 => "45",
            Self::Minutes60 => "60",
        }
    }

    pub fn minutes(self) -> u32 {
        self.option().minutes
    }

    /// Table price for this duration.
    pub fn price(self) -> Price {
        self.option().price
    }

    fn option(self) -> &'static DurationOption {
        // Every variant has exactly one row; the fallback is unreachable.
        DURATION_OPTIONS
            .iter()
            .find(|o| o.duration == self)
            .unwrap_or(&DURATION_OPTIONS[0])
    }
}

impl Default for SessionDuration {
    fn default() -> Self {
        Self::Minutes15
    }
}

impl std::fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} min", self.minutes())
    }
}
