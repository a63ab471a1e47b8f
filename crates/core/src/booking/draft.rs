use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::pricing::SessionDuration;
use super::slots::TimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Card details collected on the payment step. Never sent anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub card_name: String,
    pub card_number: String,
    /// `MM/YY`.
    pub expiry_date: String,
    pub cvv: String,
}

impl PaymentDetails {
    /// Card number reduced to its last four digits for display.
    pub fn masked_card_number(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().collect();
        if digits.len() <= 4 {
            return "*".repeat(digits.len());
        }
        let tail: String = digits[digits.len() - 4..].iter().collect();
        format!("{}{tail}", "*".repeat(digits.len() - 4))
    }
}

/// In-progress, unsaved booking. Lives only as long as the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    pub duration: Option<SessionDuration>,
    pub goal: String,
    pub topics: Vec<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub notes: String,
    #[serde(flatten)]
    pub payment: PaymentDetails,
    pub agree_terms: bool,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            date: None,
            time: None,
            duration: Some(SessionDuration::default()),
            goal: String::new(),
            topics: Vec::new(),
            experience_level: None,
            notes: String::new(),
            payment: PaymentDetails::default(),
            agree_terms: false,
        }
    }
}
