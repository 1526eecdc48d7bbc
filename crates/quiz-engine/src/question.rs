//! Questions and question banks.
//!
//! A [`QuestionBank`] is the fixed, ordered list of questions a session walks
//! through. Banks are usually loaded from a JSON file:
//!
//! ```json
//! [
//!   { "prompt": "Who has scored the most runs in ODI cricket?",
//!     "options": ["Sachin Tendulkar", "Virat Kohli", "Ricky Ponting", "Brian Lara"],
//!     "answer": 0 }
//! ]
//! ```
//!
//! `answer` is the zero-based index of the correct option. Ordinals are
//! assigned from array position, starting at 1.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

/// A single multiple-choice question. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    ordinal: usize,
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    /// Creates a question at the given 1-based position.
    #[must_use]
    pub fn new(
        ordinal: usize,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Self {
        Self {
            ordinal,
            prompt: prompt.into(),
            options,
            correct_index,
        }
    }

    /// 1-based position of this question in its bank.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The question text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The answer options, in display order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Zero-based index of the correct option.
    #[must_use]
    pub const fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// The text of the correct option, if the index is in range.
    #[must_use]
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }

    /// Returns `true` if `selected` is the correct option.
    ///
    /// Out-of-range selections are simply wrong.
    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected < self.options.len() && selected == self.correct_index
    }

    fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(QuizError::invalid_question(self.ordinal, "prompt is empty"));
        }
        if self.options.is_empty() {
            return Err(QuizError::invalid_question(self.ordinal, "has no options"));
        }
        if self.correct_index >= self.options.len() {
            return Err(QuizError::invalid_question(
                self.ordinal,
                format!(
                    "answer index {} is out of range for {} options",
                    self.correct_index,
                    self.options.len()
                ),
            ));
        }
        Ok(())
    }
}

/// One entry of a bank file.
#[derive(Debug, Clone, Deserialize)]
struct QuestionEntry {
    prompt: String,
    options: Vec<String>,
    answer: usize,
}

/// An ordered, read-only sequence of questions.
///
/// Cloning is cheap; clones share the same underlying list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Arc<[Question]>,
}

impl QuestionBank {
    /// Builds a bank from questions, validating each one.
    ///
    /// Each question's ordinal must be its 1-based position in `questions`.
    /// An empty bank is allowed here; starting a session with it is what
    /// fails.
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        for (i, question) in questions.iter().enumerate() {
            if question.ordinal != i + 1 {
                return Err(QuizError::invalid_question(
                    i + 1,
                    format!("has ordinal {}, expected {}", question.ordinal, i + 1),
                ));
            }
            question.validate()?;
        }
        Ok(Self {
            questions: questions.into(),
        })
    }

    /// Parses a bank from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<QuestionEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Loads a bank from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::BankNotFound` if the file doesn't exist,
    /// `QuizError::BankParseError` if it is not a valid bank, and
    /// `QuizError::InvalidQuestion` if a question is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QuizError::bank_not_found(path));
            }
            Err(e) => return Err(QuizError::bank_parse(path, e.to_string())),
        };

        let entries: Vec<QuestionEntry> = serde_json::from_str(&contents)
            .map_err(|e| QuizError::bank_parse(path, e.to_string()))?;
        let bank = Self::from_entries(entries)?;
        tracing::debug!(path = %path.display(), questions = bank.len(), "Question bank loaded");
        Ok(bank)
    }

    fn from_entries(entries: Vec<QuestionEntry>) -> Result<Self> {
        let questions = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| Question::new(i + 1, entry.prompt, entry.options, entry.answer))
            .collect();
        Self::new(questions)
    }

    /// The built-in cricket quiz.
    #[must_use]
    pub fn sample() -> Self {
        let question = |ordinal, prompt: &str, options: [&str; 4], correct| {
            Question::new(
                ordinal,
                prompt,
                options.iter().map(ToString::to_string).collect(),
                correct,
            )
        };

        Self {
            questions: vec![
                question(
                    1,
                    "Who has scored the most runs in ODI cricket?",
                    ["Sachin Tendulkar", "Virat Kohli", "Ricky Ponting", "Brian Lara"],
                    0,
                ),
                question(
                    2,
                    "Which country has won the most ICC Cricket World Cups?",
                    ["Australia", "India", "South Africa", "Pakistan"],
                    0,
                ),
                question(
                    3,
                    "Who holds the record for the most dismissals by a wicketkeeper in ODIs?",
                    ["MS Dhoni", "Kumar Sangakkara", "Adam Gilchrist", "Mark Boucher"],
                    1,
                ),
                question(
                    4,
                    "Who has the highest batting average in Test cricket?",
                    ["Donald Bradman", "Sachin Tendulkar", "Virat Kohli", "Brian Lara"],
                    0,
                ),
            ]
            .into(),
        }
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns `true` if the bank has no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The question at a zero-based index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Iterates the questions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
