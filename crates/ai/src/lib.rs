//! AI feedback on student task submissions.
//!
//! [`TaskReviewer`](task_review::TaskReviewer) renders the fixed review
//! prompt, makes exactly one structured call through a
//! [`TextGenerator`](generator::TextGenerator), and parses the three-field
//! result. [`GeminiClient`](gemini::GeminiClient) is the hosted backend.

pub mod gemini;
pub mod generator;
pub mod task_review;

pub use gemini::GeminiClient;
pub use generator::{AiError, GenerationRequest, TextGenerator, UnconfiguredGenerator};
pub use task_review::{ReviewError, ReviewForm, ReviewOutcome, TaskReviewer};
