//! AI task review: input/output types, prompt template and response schema.
//!
//! The generator itself lives in the `mentorhub-ai` crate; everything here
//! is pure so the template can be tested without a model.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::account::not_blank;
use crate::error::FieldErrors;

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Instructional prompt sent for every review. `{name}` tokens are
/// replaced by [`render_prompt`].
pub const TASK_REVIEW_TEMPLATE: &str = "\
You are an AI assistant helping mentors review student submissions for programming tasks.

Your goal is to identify knowledge gaps, provide targeted feedback, and offer an overall assessment.

Consider the task description, student submission, and any relevant context provided.

Task Description: {task_description}
Student Submission: {student_submission}
Relevant Context: {relevant_context}

Based on this information, please provide:

1. Knowledge Gaps: Identify specific areas where the student lacks understanding.
2. Targeted Feedback: Offer concrete suggestions for improvement.
3. Overall Assessment: Give a summary of the student's performance and potential next steps.
Please write in a concise and professional manner.
";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("valid regex"));

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskReviewInput {
    #[validate(custom(function = "not_blank", message = "Task description is required."))]
    pub task_description: String,
    #[validate(custom(function = "not_blank", message = "Submission is required."))]
    pub student_submission: String,
    #[serde(default)]
    pub relevant_context: Option<String>,
}

impl TaskReviewInput {
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

/// Structured feedback returned by the model. Fields are expected to be
/// non-empty but the model does not guarantee it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReviewOutput {
    pub knowledge_gaps: String,
    pub targeted_feedback: String,
    pub overall_assessment: String,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Fill [`TASK_REVIEW_TEMPLATE`] from `input`. A missing context renders as
/// an empty string; unknown placeholders are left as written.
pub fn render_prompt(input: &TaskReviewInput) -> String {
    PLACEHOLDER_RE
        .replace_all(TASK_REVIEW_TEMPLATE, |caps: &Captures<'_>| {
            match &caps[1] {
                "task_description" => input.task_description.clone(),
                "student_submission" => input.student_submission.clone(),
                "relevant_context" => input.relevant_context.clone().unwrap_or_default(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Response schema matching [`TaskReviewOutput`], in the OpenAPI subset the
/// Gemini `responseSchema` accepts.
pub fn output_schema() -> Value {
    let field = |description: &str| json!({ "type": "STRING", "description": description });
    json!({
        "type": "OBJECT",
        "properties": {
            "knowledgeGaps": field("Identified knowledge gaps in the student's submission."),
            "targetedFeedback": field("Specific and actionable feedback for the student."),
            "overallAssessment": field("An overall assessment of the student's work."),
        },
        "required": ["knowledgeGaps", "targetedFeedback", "overallAssessment"],
        "propertyOrdering": ["knowledgeGaps", "targetedFeedback", "overallAssessment"],
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> TaskReviewInput {
        TaskReviewInput {
            task_description: "Build a login form".into(),
            student_submission: "<form>...</form>".into(),
            relevant_context: Some("React course".into()),
        }
    }

    // -- validation --

    #[test]
    fn valid_input_passes() {
        assert!(input().check().is_ok());
    }

    #[test]
    fn blank_submission_rejected() {
        let mut i = input();
        i.student_submission = "   ".into();
        let errors = i.check().unwrap_err();
        assert!(errors.contains("studentSubmission"));
        assert!(!errors.contains("taskDescription"));
    }

    #[test]
    fn empty_description_rejected() {
        let mut i = input();
        i.task_description.clear();
        assert!(i.check().unwrap_err().contains("taskDescription"));
    }

    // -- rendering --

    #[test]
    fn prompt_embeds_all_inputs() {
        let prompt = render_prompt(&input());
        assert!(prompt.contains("Task Description: Build a login form"));
        assert!(prompt.contains("Student Submission: <form>...</form>"));
        assert!(prompt.contains("Relevant Context: React course"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn missing_context_renders_empty() {
        let mut i = input();
        i.relevant_context = None;
        let prompt = render_prompt(&i);
        assert!(prompt.contains("Relevant Context: \n"));
    }

    #[test]
    fn braces_in_submission_are_not_expanded() {
        let mut i = input();
        i.student_submission = "fn main() { println!(\"{task_description}\") }".into();
        let prompt = render_prompt(&i);
        assert!(prompt.contains("println!(\"{task_description}\")"));
    }

    // -- schema --

    #[test]
    fn schema_requires_three_fields() {
        let schema = output_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 3);
        assert_eq!(schema["properties"]["targetedFeedback"]["type"], "STRING");
    }

    #[test]
    fn output_parses_camel_case() {
        let out: TaskReviewOutput = serde_json::from_value(json!({
            "knowledgeGaps": "a",
            "targetedFeedback": "b",
            "overallAssessment": "c",
        }))
        .unwrap();
        assert_eq!(out.targeted_feedback, "b");
    }
}
