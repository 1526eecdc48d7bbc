//! Configuration types for the quiz engine.
//!
//! A quiz is configured from an optional `quiz.json` file. Every field has a
//! default, so a missing file simply yields [`QuizConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "quiz.json";

/// Default countdown per question in seconds.
const fn default_question_seconds() -> u32 {
    10
}

/// Default question bank path.
fn default_bank() -> String {
    "questions.json".to_string()
}

/// Default output directory for reports.
fn default_output_dir() -> String {
    ".".to_string()
}

/// Default value for boolean options that default to true.
const fn default_true() -> bool {
    true
}

/// Main configuration for a quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfig {
    /// Countdown applied to every question, in whole seconds.
    #[serde(default = "default_question_seconds")]
    pub question_seconds: u32,

    /// Path to the question bank file.
    #[serde(default = "default_bank")]
    pub bank: String,

    /// Output directory for generated reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Whether to write reports when the quiz finishes.
    #[serde(default = "default_true")]
    pub write_report: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_seconds: default_question_seconds(),
            bank: default_bank(),
            output_dir: default_output_dir(),
            write_report: default_true(),
        }
    }
}

impl QuizConfig {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `quiz.json` in the current directory and falls back to the
    /// defaults when it is absent.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            QuizError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `quiz.json` inside `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::ConfigParseError` if the file exists but cannot be
    /// read or parsed, and `QuizError::ConfigValidationError` if the parsed
    /// values are out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(QuizError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| QuizError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - `question_seconds` must be greater than 0
    /// - `bank` must not be empty
    /// - `output_dir` must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.question_seconds == 0 {
            return Err(QuizError::config_validation(
                "questionSeconds must be greater than 0",
                "Set questionSeconds to at least 1 in your quiz.json",
            ));
        }

        if self.bank.trim().is_empty() {
            return Err(QuizError::config_validation(
                "bank path must not be empty",
                "Provide a valid question bank path in your quiz.json",
            ));
        }

        if self.output_dir.trim().is_empty() {
            return Err(QuizError::config_validation(
                "outputDir must not be empty",
                "Provide a valid output directory path in your quiz.json (use '.' for current directory)",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = QuizConfig::default();

        assert_eq!(config.question_seconds, 10);
        assert_eq!(config.bank, "questions.json");
        assert_eq!(config.output_dir, ".");
        assert!(config.write_report);
    }

    #[test]
    fn test_config_deserialization_with_defaults() {
        let config: QuizConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, QuizConfig::default());
    }

    #[test]
    fn test_config_deserialization_with_overrides() {
        let json = r#"{
            "questionSeconds": 30,
            "bank": "cricket.json",
            "writeReport": false
        }"#;
        let config: QuizConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.question_seconds, 30);
        assert_eq!(config.bank, "cricket.json");
        assert!(!config.write_report);
        assert_eq!(config.output_dir, ".");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{"questionSeconds": 5, "theme": "dark"}"#;
        let config: QuizConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.question_seconds, 5);
    }

    #[test]
    fn test_config_serialization_uses_camel_case() {
        let json = serde_json::to_string(&QuizConfig::default()).unwrap();
        assert!(json.contains(r#""questionSeconds":10"#));
        assert!(json.contains(r#""outputDir":".""#));
        assert!(json.contains(r#""writeReport":true"#));
    }

    #[test]
    fn test_config_validation_zero_seconds() {
        let config = QuizConfig {
            question_seconds: 0,
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(
            matches!(&err, QuizError::ConfigValidationError { message, suggestion }
                if message.contains("questionSeconds") && suggestion.contains("questionSeconds")),
            "Expected ConfigValidationError about questionSeconds, got: {err:?}"
        );
    }

    #[test]
    fn test_config_validation_empty_paths() {
        let config = QuizConfig {
            bank: "   ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = QuizConfig {
            output_dir: String::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(&err, QuizError::ConfigValidationError { message, .. } if message.contains("outputDir")),
            "Expected ConfigValidationError about outputDir, got: {err:?}"
        );
    }

    #[test]
    fn test_load_from_file_valid_json() {
        let config_path = std::env::temp_dir().join("test_quiz_valid.json");
        let mut file = std::fs::File::create(&config_path).unwrap();
        file.write_all(br#"{"questionSeconds": 15, "bank": "mine.json"}"#)
            .unwrap();

        let config = QuizConfig::load_from_file(&config_path).unwrap();
        assert_eq!(config.question_seconds, 15);
        assert_eq!(config.bank, "mine.json");
        assert!(config.write_report);

        std::fs::remove_file(&config_path).ok();
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let config_path = std::env::temp_dir().join("test_quiz_invalid.json");
        let mut file = std::fs::File::create(&config_path).unwrap();
        file.write_all(b"{ not valid json }").unwrap();

        let err = QuizConfig::load_from_file(&config_path).unwrap_err();
        assert!(
            matches!(&err, QuizError::ConfigParseError { path, message } if *path == config_path && !message.is_empty()),
            "Expected ConfigParseError with correct path, got: {err:?}"
        );

        std::fs::remove_file(&config_path).ok();
    }

    #[test]
    fn test_load_from_file_validates_after_parsing() {
        let config_path = std::env::temp_dir().join("test_quiz_validation.json");
        let mut file = std::fs::File::create(&config_path).unwrap();
        file.write_all(br#"{"questionSeconds": 0}"#).unwrap();

        let err = QuizConfig::load_from_file(&config_path).unwrap_err();
        assert!(
            matches!(&err, QuizError::ConfigValidationError { .. }),
            "Expected ConfigValidationError, got: {err:?}"
        );

        std::fs::remove_file(&config_path).ok();
    }

    #[test]
    fn test_load_from_file_nonexistent_returns_default() {
        let config = QuizConfig::load_from_file(&PathBuf::from("/nonexistent/quiz.json")).unwrap();
        assert_eq!(config, QuizConfig::default());
    }

    #[test]
    fn test_load_from_dir_finds_quiz_json() {
        let temp_dir = std::env::temp_dir().join("test_quiz_dir");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let config_path = temp_dir.join("quiz.json");
        std::fs::write(&config_path, r#"{"outputDir": "reports"}"#).unwrap();

        let config = QuizConfig::load_from_dir(&temp_dir).unwrap();
        assert_eq!(config.output_dir, "reports");

        std::fs::remove_file(&config_path).ok();
        std::fs::remove_dir(&temp_dir).ok();
    }
}
