//! Markdown report generation for quiz results.
//!
//! This module provides the [`MarkdownGenerator`] struct for converting a
//! [`Report`] into a human-readable Markdown document with a summary table,
//! a per-question breakdown and a footer.
//!
//! # Example
//!
//! ```rust
//! use quiz_report::{MarkdownGenerator, Report, ReportSummary};
//!
//! let report = Report {
//!     quiz_name: "Cricket".to_string(),
//!     summary: ReportSummary {
//!         score: 3,
//!         total_questions: 4,
//!         percentage: 75,
//!         ..Default::default()
//!     },
//!     questions: vec![],
//! };
//!
//! let markdown = MarkdownGenerator::new(&report).generate();
//! assert!(markdown.contains("# Quiz Report: Cricket"));
//! assert!(markdown.contains("| Score | 3/4 (75%) |"));
//! ```

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::{QuestionEntry, QuestionResult, Report};

/// Generates Markdown reports from quiz results.
pub struct MarkdownGenerator<'a> {
    report: &'a Report,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a new Markdown generator for the given report.
    #[must_use]
    pub const fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Generates the complete Markdown report.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        self.write_summary(&mut output);
        self.write_questions(&mut output);
        Self::write_footer(&mut output);

        output
    }

    fn write_title(&self, output: &mut String) {
        let _ = writeln!(
            output,
            "# Quiz Report: {}\n",
            escape_markdown(&self.report.quiz_name)
        );
    }

    /// Writes the summary section with metrics table.
    fn write_summary(&self, output: &mut String) {
        let summary = &self.report.summary;

        let _ = writeln!(output, "## Summary\n");
        let _ = writeln!(output, "| Metric | Value |");
        let _ = writeln!(output, "|--------|-------|");
        let _ = writeln!(
            output,
            "| Score | {}/{} ({}%) |",
            summary.score, summary.total_questions, summary.percentage
        );
        let _ = writeln!(output, "| Correct | {} |", summary.correct);
        let _ = writeln!(output, "| Incorrect | {} |", summary.incorrect);
        let _ = writeln!(output, "| Timed Out | {} |", summary.timed_out);
        let _ = writeln!(
            output,
            "| Time per Question | {} |",
            format_duration(u64::from(summary.question_seconds))
        );
        let _ = writeln!(
            output,
            "| Duration | {} |",
            format_duration(summary.duration_seconds)
        );
        if let Some(started_at) = &summary.started_at {
            let _ = writeln!(output, "| Started | {} |", format_timestamp(started_at));
        }
        let _ = writeln!(output);
    }

    /// Writes the per-question table.
    fn write_questions(&self, output: &mut String) {
        let _ = writeln!(output, "## Questions\n");

        if self.report.questions.is_empty() {
            let _ = writeln!(output, "*No questions were asked.*\n");
            return;
        }

        let _ = writeln!(
            output,
            "| # | Question | Your Answer | Correct Answer | Result | Time |"
        );
        let _ = writeln!(
            output,
            "|---|----------|-------------|----------------|--------|------|"
        );

        for entry in &self.report.questions {
            Self::write_question_entry(output, entry);
        }

        let _ = writeln!(output);
    }

    fn write_question_entry(output: &mut String, entry: &QuestionEntry) {
        let ordinal = entry.ordinal;
        let prompt = escape_markdown(&entry.prompt);
        let selected = entry
            .selected_answer
            .as_deref()
            .map_or_else(|| "-".to_string(), escape_markdown);
        let correct = escape_markdown(&entry.correct_answer);
        let icon = result_icon(entry.result);
        let result = entry.result;
        let time = format_duration(u64::from(entry.time_taken_seconds));
        let _ = writeln!(
            output,
            "| {ordinal} | {prompt} | {selected} | {correct} | {icon} {result} | {time} |"
        );
    }

    /// Writes the report footer.
    fn write_footer(output: &mut String) {
        let _ = writeln!(output, "---");
        let timestamp = format_timestamp(&Utc::now());
        let _ = writeln!(output, "*Generated by quiz at {timestamp}*");
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Formats a duration in seconds to a human-readable string.
///
/// Examples:
/// - 65 seconds -> "1m 5s"
/// - 3661 seconds -> "1h 1m 1s"
/// - 45 seconds -> "45s"
fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();

    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }

    parts.join(" ")
}

/// Format: "YYYY-MM-DD HH:MM:SS UTC"
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// HTML entity for a result, so the output renders the same everywhere.
const fn result_icon(result: QuestionResult) -> &'static str {
    match result {
        QuestionResult::Correct => "&#9989;",
        QuestionResult::Incorrect => "&#10060;",
        QuestionResult::TimedOut => "&#8987;",
    }
}

/// Escapes special Markdown characters in text.
///
/// This prevents user content from being interpreted as Markdown formatting.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '(' | ')' | '!' | '\\' | '<' | '>' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            // Table cells cannot hold raw newlines.
            '\n' => result.push_str("<br>"),
            _ => result.push(ch),
        }
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
