//! Task review flow and the form action wrapping it.

use std::sync::Arc;

use mentorhub_core::error::FieldErrors;
use mentorhub_core::review::{output_schema, render_prompt, TaskReviewInput, TaskReviewOutput};
use serde::{Deserialize, Serialize};

use crate::generator::{AiError, GenerationRequest, TextGenerator};

pub const MSG_INVALID_FORM: &str = "Invalid form data.";
pub const MSG_REVIEW_COMPLETED: &str = "Review completed successfully.";
pub const MSG_REVIEW_FAILED: &str = "An error occurred during AI review.";

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Invalid fields: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Generation(#[from] AiError),

    #[error("Review output did not match the schema: {0}")]
    Output(#[from] serde_json::Error),
}

/// Submitted review form. Missing fields deserialize as empty and fail
/// validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewForm {
    #[serde(default)]
    pub task_description: String,
    #[serde(default)]
    pub student_submission: String,
}

/// Form state handed back to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub success: bool,
    pub message: String,
    pub data: Option<TaskReviewOutput>,
}

impl ReviewOutcome {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data: None,
        }
    }
}

#[derive(Clone)]
pub struct TaskReviewer {
    generator: Arc<dyn TextGenerator>,
}

impl TaskReviewer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Validate, render the prompt, and call the generator exactly once.
    pub async fn review(&self, input: &TaskReviewInput) -> Result<TaskReviewOutput, ReviewError> {
        input.check().map_err(ReviewError::Invalid)?;

        let request = GenerationRequest {
            prompt: render_prompt(input),
            response_schema: output_schema(),
        };
        tracing::debug!(generator = self.generator.name(), "Requesting task review");
        let value = self.generator.generate(&request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Form action: never fails, reports the outcome instead.
    pub async fn submit_for_review(
        &self,
        form: ReviewForm,
        relevant_context: Option<String>,
    ) -> ReviewOutcome {
        let input = TaskReviewInput {
            task_description: form.task_description,
            student_submission: form.student_submission,
            relevant_context,
        };
        if input.check().is_err() {
            return ReviewOutcome::failure(MSG_INVALID_FORM);
        }

        match self.review(&input).await {
            Ok(output) => ReviewOutcome {
                success: true,
                message: MSG_REVIEW_COMPLETED.to_string(),
                data: Some(output),
            },
            Err(e) => {
                tracing::error!(error = %e, "AI task review failed");
                ReviewOutcome::failure(MSG_REVIEW_FAILED)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
