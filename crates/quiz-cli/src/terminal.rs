//! Console rendering of a quiz session.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quiz_engine::{DisplaySink, QuestionOutcome, Resolution};

/// Display sink that writes to stdout.
///
/// The countdown is redrawn in place on a single line. The ordinal of the
/// question on screen is published so typed answers can be tied to it.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    on_screen: Arc<AtomicUsize>,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared ordinal of the question last shown; 0 before the first one.
    pub fn on_screen(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.on_screen)
    }
}

fn flush() {
    // A broken stdout is not worth aborting the quiz for.
    let _ = std::io::stdout().flush();
}

impl DisplaySink for TerminalDisplay {
    fn on_question_shown(&self, ordinal: usize, prompt: &str, options: &[String]) {
        println!();
        println!("Question {ordinal}: {prompt}");
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        println!("Type the number of your answer and press Enter.");
        flush();
        self.on_screen.store(ordinal, Ordering::SeqCst);
    }

    fn on_time_updated(&self, remaining_seconds: u32) {
        print!("\rTime: {remaining_seconds:>2}s ");
        flush();
    }

    fn on_question_resolved(&self, outcome: &QuestionOutcome) {
        match outcome.resolution {
            Resolution::Answered { correct: true, .. } => println!("\nCorrect!"),
            Resolution::Answered { correct: false, .. } => println!("\nWrong answer."),
            Resolution::TimedOut => println!("\nTime's up!"),
        }
    }

    fn on_session_finished(&self, final_score: u32, total_questions: usize) {
        println!();
        println!("Quiz Over! Your final score is: {final_score}/{total_questions}");
        flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_question_on_screen() {
        let display = TerminalDisplay::new();
        let on_screen = display.on_screen();
        assert_eq!(on_screen.load(Ordering::SeqCst), 0);

        display.on_question_shown(2, "Second?", &["a".to_string(), "b".to_string()]);
        assert_eq!(on_screen.load(Ordering::SeqCst), 2);
    }
}
