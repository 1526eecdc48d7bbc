//! Quiz Engine
//!
//! Runs timed multiple-choice quiz sessions: per-question countdowns, answer
//! submission, and the race between the two.

pub mod config;
pub mod display;
pub mod error;
pub mod question;
pub mod session;
pub mod timer;

pub use config::QuizConfig;
pub use display::{
    DisplaySink, EventBroadcaster, QuestionShownPayload, SessionEvent, SessionFinishedPayload,
    TimeUpdatedPayload,
};
pub use error::{QuizError, Result};
pub use question::{Question, QuestionBank};
pub use session::{QuestionOutcome, QuizSession, Resolution, SessionSnapshot, SessionStatus};
pub use timer::{CountdownTimer, TimerState};
