//! Error types for the quiz engine.
//!
//! Only configuration problems are surfaced as errors. Anomalies inside a
//! running session (stale submissions, late timer expiry, out-of-range
//! answers) are absorbed by the session controller and never reach callers.

use std::path::PathBuf;

/// A specialized `Result` type for quiz engine operations.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Errors that can occur while configuring or starting a quiz session.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your quiz.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Question Bank Errors
    // ========================================================================
    /// A session was started with no questions.
    #[error("Question bank is empty\n\nSuggestion: Add at least one question before starting a quiz")]
    EmptyBank,

    /// Question bank file was not found at the specified path.
    #[error("Question bank not found: '{path}'\n\nSuggestion: Check the 'bank' field in quiz.json or pass a bank file on the command line")]
    BankNotFound {
        /// Path where the bank was expected.
        path: PathBuf,
    },

    /// Question bank file could not be parsed.
    #[error("Invalid question bank '{path}': {message}\n\nSuggestion: The bank must be a JSON array of {{\"prompt\", \"options\", \"answer\"}} objects")]
    BankParseError {
        /// Path to the bank file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// A single question is malformed.
    #[error("Invalid question {ordinal}: {message}")]
    InvalidQuestion {
        /// 1-based position of the question in its bank.
        ordinal: usize,
        /// What is wrong with it.
        message: String,
    },

    // ========================================================================
    // Timer Errors
    // ========================================================================
    /// A countdown was requested with a zero duration.
    #[error("Countdown duration must be greater than 0 seconds")]
    ZeroDuration,

    // ========================================================================
    // State Machine Errors
    // ========================================================================
    /// Invalid state transition attempted.
    #[error("Invalid state transition: cannot go from {from} to {to}")]
    InvalidStateTransition {
        /// The current state.
        from: String,
        /// The attempted target state.
        to: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuizError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `BankNotFound` error.
    #[must_use]
    pub fn bank_not_found(path: impl Into<PathBuf>) -> Self {
        Self::BankNotFound { path: path.into() }
    }

    /// Creates a new `BankParseError`.
    #[must_use]
    pub fn bank_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::BankParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidQuestion` error.
    #[must_use]
    pub fn invalid_question(ordinal: usize, message: impl Into<String>) -> Self {
        Self::InvalidQuestion {
            ordinal,
            message: message.into(),
        }
    }

    /// Creates a new `InvalidStateTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Returns `true` if this error stems from caller-supplied configuration.
    ///
    /// These are the only errors a session ever reports; the caller has to
    /// fix its input before retrying.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
                | Self::EmptyBank
                | Self::BankNotFound { .. }
                | Self::BankParseError { .. }
                | Self::InvalidQuestion { .. }
                | Self::ZeroDuration
        )
    }
}
