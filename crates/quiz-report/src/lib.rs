//! Quiz Report Generation
//!
//! This crate turns the results of a finished quiz session into a report that
//! can be serialized to JSON for programmatic access or rendered to Markdown
//! for people.
//!
//! # Types
//!
//! - [`ReportInput`] - Raw session results handed over by the front end
//! - [`ReportGenerator`] - Validates the input and derives the [`Report`]
//! - [`Report`] - The complete report structure
//! - [`ReportSummary`] - Score, counts and timing
//! - [`QuestionEntry`] - One row per question
//!
//! # Generators
//!
//! - [`json::JsonGenerator`] - Generate JSON reports with compact or pretty formatting
//! - [`MarkdownGenerator`] - Generate human-readable Markdown reports
//!
//! # Example
//!
//! ```rust
//! use quiz_report::{MarkdownGenerator, QuestionInput, QuestionResult, ReportGenerator, ReportInput};
//!
//! let input = ReportInput {
//!     quiz_name: "Cricket".to_string(),
//!     questions: vec![QuestionInput {
//!         ordinal: 1,
//!         prompt: "Who has scored the most runs in ODI cricket?".to_string(),
//!         correct_answer: "Sachin Tendulkar".to_string(),
//!         selected_answer: Some("Sachin Tendulkar".to_string()),
//!         result: QuestionResult::Correct,
//!         remaining_seconds: 6,
//!     }],
//!     ..Default::default()
//! };
//!
//! let report = ReportGenerator::new(input).generate().unwrap();
//! assert_eq!(report.summary.score, 1);
//!
//! let markdown = MarkdownGenerator::new(&report).generate();
//! assert!(markdown.contains("# Quiz Report: Cricket"));
//! ```

pub mod json;
mod markdown;

pub use markdown::MarkdownGenerator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write report files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid report data.
    #[error("invalid report data: {0}")]
    InvalidData(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// QuestionResult
// ============================================================================

/// How a single question ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionResult {
    /// Answered with the correct option.
    Correct,
    /// Answered with a wrong or out-of-range option.
    Incorrect,
    /// The countdown ran out first.
    #[default]
    TimedOut,
}

impl QuestionResult {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::Incorrect => "Incorrect",
            Self::TimedOut => "Timed out",
        }
    }
}

impl std::fmt::Display for QuestionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// ReportInput
// ============================================================================

/// Results of one question as recorded by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionInput {
    /// 1-based position of the question.
    pub ordinal: usize,
    /// The question text.
    pub prompt: String,
    /// Text of the correct option.
    pub correct_answer: String,
    /// Text of the submitted option; `None` on timeout or an out-of-range pick.
    pub selected_answer: Option<String>,
    /// How the question ended.
    pub result: QuestionResult,
    /// Seconds left on the countdown when the question was resolved.
    pub remaining_seconds: u32,
}

/// Everything needed to build a [`Report`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInput {
    /// Display name of the quiz (usually the bank file name).
    pub quiz_name: String,
    /// When the session began.
    pub started_at: Option<DateTime<Utc>>,
    /// When the session finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Countdown per question in seconds.
    pub question_seconds: u32,
    /// Per-question results, in order.
    pub questions: Vec<QuestionInput>,
}

// ============================================================================
// ReportGenerator
// ============================================================================

/// Derives a [`Report`] from a [`ReportInput`].
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    input: ReportInput,
}

impl ReportGenerator {
    /// Creates a generator over `input`.
    #[must_use]
    pub const fn new(input: ReportInput) -> Self {
        Self { input }
    }

    /// Builds the report.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidData` if the quiz name is empty, if the
    /// question ordinals are not `1..=n` in order, or if the session finished
    /// before it started.
    pub fn generate(self) -> Result<Report> {
        let input = self.input;

        if input.quiz_name.trim().is_empty() {
            return Err(ReportError::InvalidData("quiz_name is required".to_string()));
        }

        for (i, question) in input.questions.iter().enumerate() {
            if question.ordinal != i + 1 {
                return Err(ReportError::InvalidData(format!(
                    "question at position {} has ordinal {}",
                    i + 1,
                    question.ordinal
                )));
            }
        }

        let duration_seconds = match (input.started_at, input.finished_at) {
            (Some(start), Some(end)) if end < start => {
                return Err(ReportError::InvalidData(
                    "finished_at is before started_at".to_string(),
                ));
            }
            (Some(start), Some(end)) => u64::try_from((end - start).num_seconds()).unwrap_or(0),
            _ => 0,
        };

        let count = |result: QuestionResult| {
            input
                .questions
                .iter()
                .filter(|q| q.result == result)
                .count()
        };
        let correct = count(QuestionResult::Correct);
        let incorrect = count(QuestionResult::Incorrect);
        let timed_out = count(QuestionResult::TimedOut);
        let total = input.questions.len();

        let summary = ReportSummary {
            score: u32::try_from(correct).unwrap_or(u32::MAX),
            total_questions: total,
            percentage: percentage(correct, total),
            correct,
            incorrect,
            timed_out,
            question_seconds: input.question_seconds,
            duration_seconds,
            started_at: input.started_at,
            finished_at: input.finished_at,
        };

        let questions = input
            .questions
            .into_iter()
            .map(|q| QuestionEntry {
                ordinal: q.ordinal,
                prompt: q.prompt,
                correct_answer: q.correct_answer,
                selected_answer: q.selected_answer,
                result: q.result,
                time_taken_seconds: input.question_seconds.saturating_sub(q.remaining_seconds),
            })
            .collect();

        Ok(Report {
            quiz_name: input.quiz_name,
            summary,
            questions,
        })
    }
}

/// Whole-number percentage, rounded down. 0 for an empty quiz.
fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    u32::try_from(correct * 100 / total).unwrap_or(100)
}

// ============================================================================
// Report
// ============================================================================

/// Complete end-of-session report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Display name of the quiz.
    pub quiz_name: String,

    /// Score, counts and timing.
    pub summary: ReportSummary,

    /// One entry per question, in order.
    pub questions: Vec<QuestionEntry>,
}

impl Report {
    /// Serializes the report to JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Serialization` if JSON serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ReportError::from)
    }

    /// Returns `true` if every question was answered correctly.
    #[must_use]
    pub const fn is_perfect(&self) -> bool {
        self.summary.total_questions > 0 && self.summary.correct == self.summary.total_questions
    }
}

// ============================================================================
// ReportSummary
// ============================================================================

/// High-level summary of a quiz session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Final score.
    pub score: u32,

    /// Number of questions in the quiz.
    pub total_questions: usize,

    /// Score as a whole-number percentage of `total_questions`.
    pub percentage: u32,

    /// Questions answered correctly.
    pub correct: usize,

    /// Questions answered wrongly.
    pub incorrect: usize,

    /// Questions whose countdown ran out.
    pub timed_out: usize,

    /// Countdown per question in seconds.
    pub question_seconds: u32,

    /// Wall-clock length of the session in seconds.
    pub duration_seconds: u64,

    /// When the session began.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the session finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

// ============================================================================
// QuestionEntry
// ============================================================================

/// Report row for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionEntry {
    /// 1-based position of the question.
    pub ordinal: usize,

    /// The question text.
    pub prompt: String,

    /// Text of the correct option.
    pub correct_answer: String,

    /// Text of the submitted option, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<String>,

    /// How the question ended.
    pub result: QuestionResult,

    /// Seconds spent before the question was resolved.
    pub time_taken_seconds: u32,
}

// ============================================================================
// Tests
// ============================================================================
