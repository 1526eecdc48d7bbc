//! End-to-end integration tests for timed quiz sessions.
//!
//! Sessions run on tokio's paused clock, so a ten-second countdown finishes
//! instantly and deterministically. Sleeps land on half seconds to stay clear
//! of tick boundaries.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quiz_engine::{
    EventBroadcaster, Question, QuestionBank, QuizConfig, QuizError, QuizSession, Resolution,
    SessionSnapshot, SessionStatus,
};
use quiz_report::{
    json::JsonGenerator, MarkdownGenerator, QuestionInput, QuestionResult, ReportGenerator,
    ReportInput,
};
use tokio::time::sleep;

/// Path to the fixtures directory.
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn options() -> Vec<String> {
    ["a", "b", "c", "d"].map(String::from).to_vec()
}

/// A bank whose questions have the given correct indices.
fn bank(correct: &[usize]) -> QuestionBank {
    let questions = correct
        .iter()
        .enumerate()
        .map(|(i, &answer)| Question::new(i + 1, format!("Question {}?", i + 1), options(), answer))
        .collect();
    QuestionBank::new(questions).expect("valid bank")
}

fn session(seconds: u32) -> QuizSession {
    QuizSession::new(seconds, Arc::new(EventBroadcaster::default())).expect("valid duration")
}

// ----------------------------------------------------------------------------
// Fixture loading
// ----------------------------------------------------------------------------

#[test]
fn test_fixture_config_loads() {
    let config = QuizConfig::load_from_dir(&fixture_path()).expect("Failed to load config");

    assert_eq!(config.question_seconds, 5);
    assert_eq!(config.bank, "questions.json");
    assert_eq!(config.output_dir, "reports");
    assert!(config.write_report);
}

#[test]
fn test_fixture_bank_loads() {
    let bank = QuestionBank::load(fixture_path().join("questions.json"))
        .expect("Failed to load question bank");

    assert_eq!(bank.len(), 3);
    let third = bank.get(2).expect("third question");
    assert_eq!(third.ordinal(), 3);
    assert_eq!(third.correct_option(), Some("Kumar Sangakkara"));
}

// ----------------------------------------------------------------------------
// Scenarios
// ----------------------------------------------------------------------------

/// Correct submission on the first of two questions before it times out.
#[tokio::test(start_paused = true)]
async fn test_correct_answer_before_timeout() {
    let session = session(10);
    session.begin(bank(&[2, 0])).expect("begin");

    sleep(Duration::from_millis(2500)).await;
    assert!(session.submit(2));

    assert_eq!(session.score(), 1);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.status(), SessionStatus::QuestionActive);

    // The second question got a fresh countdown.
    assert_eq!(session.remaining_seconds(), 10);
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(session.remaining_seconds(), 9);
}

/// No submission on the first question; its timer runs out.
#[tokio::test(start_paused = true)]
async fn test_timeout_without_answer() {
    let session = session(10);
    session.begin(bank(&[0, 0])).expect("begin");

    sleep(Duration::from_millis(10_500)).await;

    assert_eq!(session.score(), 0);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.status(), SessionStatus::QuestionActive);
    assert_eq!(session.outcomes()[0].resolution, Resolution::TimedOut);
}

/// Out-of-range selection on a one-question bank.
#[tokio::test(start_paused = true)]
async fn test_out_of_range_answer_finishes_quiz() {
    let session = session(10);
    session.begin(bank(&[0])).expect("begin");

    assert!(session.submit(99));

    assert_eq!(session.score(), 0);
    assert_eq!(session.current_index(), 1);
    assert!(session.is_finished());
}

/// Empty bank is a configuration error and never activates a question.
#[tokio::test(start_paused = true)]
async fn test_empty_bank_rejected() {
    let session = session(10);
    let empty = QuestionBank::load(fixture_path().join("empty-bank.json")).expect("loads");

    let err = session.begin(empty).expect_err("empty bank must fail");
    assert!(matches!(err, QuizError::EmptyBank));
    assert!(err.is_configuration());

    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(session.current_question().is_none());
}

// ----------------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_every_question_resolved_exactly_once() {
    let session = session(3);
    session.begin(bank(&[0, 1, 2, 3, 0])).expect("begin");

    // Mix answers, late answers and timeouts.
    assert!(session.submit_to(0, 0));
    assert!(!session.submit_to(0, 0));
    sleep(Duration::from_millis(3500)).await;
    assert!(!session.submit_to(1, 1));
    assert!(session.submit_to(2, 0));
    assert!(session.submit(3));

    session.finished().await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.current_index, 5);
    assert_eq!(snapshot.outcomes.len(), 5);
    assert_eq!(snapshot.score, 2);

    let ordinals: Vec<_> = snapshot.outcomes.iter().map(|o| o.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_late_answer_after_finish_is_ignored() {
    let session = session(1);
    session.begin(bank(&[0, 0])).expect("begin");

    session.finished().await;
    assert!(!session.submit(0));
    assert!(!session.submit_to(1, 0));

    assert_eq!(session.score(), 0);
    assert!(session.snapshot().finished_at.is_some());
}

// ----------------------------------------------------------------------------
// Full flow into a report
// ----------------------------------------------------------------------------

fn report_input(snapshot: &SessionSnapshot, bank: &QuestionBank, seconds: u32) -> ReportInput {
    let questions = snapshot
        .outcomes
        .iter()
        .map(|outcome| {
            let question = bank.get(outcome.ordinal - 1).expect("question");
            let (result, selected_answer) = match outcome.resolution {
                Resolution::Answered { selected, correct } => (
                    if correct {
                        QuestionResult::Correct
                    } else {
                        QuestionResult::Incorrect
                    },
                    question.options().get(selected).cloned(),
                ),
                Resolution::TimedOut => (QuestionResult::TimedOut, None),
            };
            QuestionInput {
                ordinal: outcome.ordinal,
                prompt: question.prompt().to_string(),
                correct_answer: question.correct_option().unwrap_or_default().to_string(),
                selected_answer,
                result,
                remaining_seconds: outcome.remaining_seconds,
            }
        })
        .collect();

    ReportInput {
        quiz_name: "questions".to_string(),
        started_at: snapshot.started_at,
        finished_at: snapshot.finished_at,
        question_seconds: seconds,
        questions,
    }
}

#[tokio::test(start_paused = true)]
async fn test_fixture_quiz_to_report() {
    let config = QuizConfig::load_from_dir(&fixture_path()).expect("config");
    let bank = QuestionBank::load(fixture_path().join(&config.bank)).expect("bank");
    let session = QuizSession::from_config(&config, Arc::new(EventBroadcaster::default()))
        .expect("session");

    session.begin(bank.clone()).expect("begin");

    // Q1 right after one tick, Q2 wrong after two, Q3 runs out.
    sleep(Duration::from_millis(1500)).await;
    assert!(session.submit(0));
    sleep(Duration::from_millis(2500)).await;
    assert!(session.submit(3));
    session.finished().await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.score, 1);

    let report = ReportGenerator::new(report_input(&snapshot, &bank, config.question_seconds))
        .generate()
        .expect("report");

    assert_eq!(report.summary.score, 1);
    assert_eq!(report.summary.total_questions, 3);
    assert_eq!(report.summary.percentage, 33);
    assert_eq!(report.summary.correct, 1);
    assert_eq!(report.summary.incorrect, 1);
    assert_eq!(report.summary.timed_out, 1);

    let taken: Vec<_> = report
        .questions
        .iter()
        .map(|q| q.time_taken_seconds)
        .collect();
    assert_eq!(taken, vec![1, 2, 5]);
    assert_eq!(report.questions[1].selected_answer.as_deref(), Some("Pakistan"));

    let markdown = MarkdownGenerator::new(&report).generate();
    assert!(markdown.contains("# Quiz Report: questions"));
    assert!(markdown.contains("| Score | 1/3 (33%) |"));

    let json = JsonGenerator::new(&report).generate().expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["summary"]["timed_out"], 1);
    assert_eq!(value["questions"][2]["result"], "timed_out");
}
