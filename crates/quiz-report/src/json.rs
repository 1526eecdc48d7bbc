//! JSON report generation.
//!
//! This module provides [`JsonGenerator`] for serializing quiz reports to JSON.
//! Reports can be generated as compact single-line JSON or pretty-printed for
//! people.
//!
//! # Example
//!
//! ```rust
//! use quiz_report::{Report, ReportSummary};
//! use quiz_report::json::JsonGenerator;
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
//! let generator = JsonGenerator::new(&report);
//!
//! let compact = generator.generate().unwrap();
//! assert!(compact.contains(r#""score":3"#));
//!
//! let pretty = generator.generate_pretty().unwrap();
//! assert!(pretty.contains('\n'));
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::{Report, ReportError, Result};

/// JSON report generator.
///
/// Wraps a [`Report`] reference and serializes it in various formats.
pub struct JsonGenerator<'a> {
    report: &'a Report,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a new JSON generator for the given report.
    #[must_use]
    pub const fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Generates compact JSON output (single line, no extra whitespace).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string(self.report).map_err(ReportError::from)
    }

    /// Generates pretty-printed JSON output with 2-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self.report).map_err(ReportError::from)
    }

    /// Writes the JSON report to a file, creating or overwriting it.
    ///
    /// Parent directories must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    /// Returns [`ReportError::Io`] if file creation or writing fails.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use quiz_report::{Report, json::JsonGenerator};
    /// use std::path::Path;
    ///
    /// let report = Report::default();
    /// JsonGenerator::new(&report)
    ///     .write_to_file(Path::new("quiz-report.json"), true)
    ///     .unwrap();
    /// ```
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            self.generate_pretty()?
        } else {
            self.generate()?
        };

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
