//! The timed quiz session controller.
//!
//! A [`QuizSession`] walks a [`QuestionBank`] one question at a time. Each
//! question gets its own [`CountdownTimer`]; the question is resolved by
//! whichever comes first, a submission or the timer's expiry. The loser of
//! that race is discarded.
//!
//! Status transitions:
//! - `Idle` -> `QuestionActive` (on [`QuizSession::begin`])
//! - `QuestionActive` -> `Evaluating` (a resolving event was accepted)
//! - `Evaluating` -> `QuestionActive` (next question) or `Finished`
//!
//! `Evaluating` only exists inside the session lock; observers never see it.
//!
//! # Locking
//!
//! All session state sits behind one mutex. Timer callbacks reach it while
//! holding their timer's lock, so the order is always timer, then session.
//! The submission path therefore releases the session lock before it cancels
//! the superseded timer. The next question's countdown is already running by
//! then, so two timers can be active for a moment; callbacks from the old one
//! carry a stale index and are dropped.
//!
//! A timer is only allowed to resolve its question while it is still stored
//! in the session. [`QuizSession::shutdown`] withdraws it under the session
//! lock, so an expiry that was already waiting on that lock finds nothing and
//! leaves the question open.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::QuizConfig;
use crate::display::DisplaySink;
use crate::error::{QuizError, Result};
use crate::question::{Question, QuestionBank};
use crate::timer::CountdownTimer;

// ============================================================================
// SessionStatus
// ============================================================================

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, no question shown yet.
    #[default]
    Idle,
    /// A question is displayed and its countdown is running.
    QuestionActive,
    /// A resolving event is being applied.
    Evaluating,
    /// Every question has been resolved.
    Finished,
}

impl SessionStatus {
    /// Returns `true` for `Finished`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quiz_engine::SessionStatus;
    ///
    /// assert!(SessionStatus::Finished.is_terminal());
    /// assert!(!SessionStatus::QuestionActive.is_terminal());
    /// ```
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::QuestionActive => write!(f, "question_active"),
            Self::Evaluating => write!(f, "evaluating"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ============================================================================
// QuestionOutcome
// ============================================================================

/// How a question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// The user submitted an option before the countdown ran out.
    Answered {
        /// Zero-based index of the submitted option (may be out of range).
        selected: usize,
        /// Whether it matched the correct option.
        correct: bool,
    },
    /// The countdown reached zero first.
    TimedOut,
}

impl Resolution {
    /// Returns `true` for a correct submission.
    #[must_use]
    pub const fn is_correct(&self) -> bool {
        matches!(self, Self::Answered { correct: true, .. })
    }
}

/// Record of one resolved question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    /// 1-based position of the question.
    pub ordinal: usize,

    /// How it was resolved.
    pub resolution: Resolution,

    /// Seconds left on the countdown when it was resolved.
    pub remaining_seconds: u32,

    /// When it was resolved.
    pub resolved_at: DateTime<Utc>,
}

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Point-in-time copy of a session's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current status.
    pub status: SessionStatus,

    /// Zero-based index of the active question; equals `total_questions`
    /// once finished.
    pub current_index: usize,

    /// Number of questions in the bank (0 before `begin`).
    pub total_questions: usize,

    /// Correct answers so far.
    pub score: u32,

    /// Seconds left on the active question.
    pub remaining_seconds: u32,

    /// One entry per resolved question, in order.
    pub outcomes: Vec<QuestionOutcome>,

    /// When `begin` succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the session finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

// ============================================================================
// QuizSession
// ============================================================================

#[derive(Debug, Default)]
struct SessionCore {
    status: SessionStatus,
    bank: Option<QuestionBank>,
    index: usize,
    score: u32,
    remaining: u32,
    timer: Option<CountdownTimer>,
    outcomes: Vec<QuestionOutcome>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl SessionCore {
    fn total(&self) -> usize {
        self.bank.as_ref().map_or(0, QuestionBank::len)
    }

    fn current_question(&self) -> Option<&Question> {
        if self.status != SessionStatus::QuestionActive {
            return None;
        }
        self.bank.as_ref().and_then(|bank| bank.get(self.index))
    }
}

/// Result of offering a resolving event to the session.
enum Acceptance {
    /// The event resolved the question; carries the superseded timer.
    Accepted(Option<CountdownTimer>),
    /// The question was already resolved, or no question is active.
    Stale,
}

struct SessionInner {
    core: Mutex<SessionCore>,
    sink: Arc<dyn DisplaySink>,
    question_seconds: u32,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, SessionCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shows the question at `core.index` and starts its countdown.
    fn activate(self: &Arc<Self>, core: &mut SessionCore) -> Result<()> {
        let index = core.index;
        let Some(question) = core.bank.as_ref().and_then(|bank| bank.get(index)) else {
            return Err(QuizError::invalid_transition(core.status, SessionStatus::QuestionActive));
        };

        self.sink
            .on_question_shown(question.ordinal(), question.prompt(), question.options());
        let timer = self.start_timer(index)?;

        core.status = SessionStatus::QuestionActive;
        core.remaining = self.question_seconds;
        core.timer = Some(timer);
        self.status_tx.send_replace(SessionStatus::QuestionActive);

        tracing::debug!(
            ordinal = index + 1,
            seconds = self.question_seconds,
            "Question active"
        );
        Ok(())
    }

    fn start_timer(self: &Arc<Self>, index: usize) -> Result<CountdownTimer> {
        let on_tick = {
            let session = Arc::downgrade(self);
            move |remaining: u32| {
                if let Some(session) = session.upgrade() {
                    session.handle_tick(index, remaining);
                }
            }
        };
        let on_expire = {
            let session = Arc::downgrade(self);
            move || {
                if let Some(session) = session.upgrade() {
                    session.handle_expiry(index);
                }
            }
        };
        CountdownTimer::start(self.question_seconds, on_tick, on_expire)
    }

    fn handle_tick(&self, index: usize, remaining: u32) {
        let mut core = self.lock();
        if core.status != SessionStatus::QuestionActive
            || core.index != index
            || core.timer.is_none()
        {
            tracing::trace!(ordinal = index + 1, remaining, "Ignoring stale tick");
            return;
        }
        core.remaining = remaining;
        self.sink.on_time_updated(remaining);
    }

    /// Called from the expiring timer's own task.
    fn handle_expiry(self: &Arc<Self>, index: usize) {
        let mut core = self.lock();
        if core.timer.is_none() {
            tracing::trace!(ordinal = index + 1, "Ignoring expiry from a stopped countdown");
            return;
        }
        // The superseded timer is the one delivering this call; it has
        // already marked itself expired, so it is dropped, not cancelled.
        if let Acceptance::Stale = self.resolve(&mut core, index, None) {
            tracing::trace!(ordinal = index + 1, "Ignoring expiry for resolved question");
        }
    }

    /// The single decision point for resolving events.
    ///
    /// Applies `selected` (or a timeout when `None`) to question `index` if
    /// and only if it is the active, unresolved question.
    fn resolve(
        self: &Arc<Self>,
        core: &mut SessionCore,
        index: usize,
        selected: Option<usize>,
    ) -> Acceptance {
        if core.status != SessionStatus::QuestionActive || core.index != index {
            return Acceptance::Stale;
        }
        let Some(bank) = core.bank.clone() else {
            return Acceptance::Stale;
        };
        let Some(question) = bank.get(index) else {
            return Acceptance::Stale;
        };

        core.status = SessionStatus::Evaluating;

        let resolution = match selected {
            Some(selected) => {
                let correct = question.is_correct(selected);
                if correct {
                    core.score += 1;
                }
                Resolution::Answered { selected, correct }
            }
            None => Resolution::TimedOut,
        };
        let outcome = QuestionOutcome {
            ordinal: question.ordinal(),
            resolution,
            remaining_seconds: core.remaining,
            resolved_at: Utc::now(),
        };
        tracing::debug!(
            ordinal = outcome.ordinal,
            resolution = ?outcome.resolution,
            remaining = outcome.remaining_seconds,
            score = core.score,
            "Question resolved"
        );
        self.sink.on_question_resolved(&outcome);
        core.outcomes.push(outcome);

        let superseded = core.timer.take();
        core.index += 1;

        if core.index >= bank.len() {
            self.finish(core);
        } else if let Err(e) = self.activate(core) {
            tracing::error!(error = %e, "Failed to start next question");
            self.finish(core);
        }

        Acceptance::Accepted(superseded)
    }

    fn finish(&self, core: &mut SessionCore) {
        core.status = SessionStatus::Finished;
        core.remaining = 0;
        core.finished_at = Some(Utc::now());

        let total = core.total();
        self.sink.on_session_finished(core.score, total);
        self.status_tx.send_replace(SessionStatus::Finished);

        tracing::info!(score = core.score, total, "Quiz session finished");
    }
}

/// Handle to a timed quiz session.
///
/// Cloning is cheap; all clones drive the same session. Must be used from
/// within a tokio runtime, since each question's countdown runs as a task.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use quiz_engine::{EventBroadcaster, QuestionBank, QuizSession};
///
/// # async fn example() -> quiz_engine::Result<()> {
/// let session = QuizSession::new(10, Arc::new(EventBroadcaster::default()))?;
/// session.begin(QuestionBank::sample())?;
///
/// session.submit(0);
/// assert_eq!(session.score(), 1);
///
/// session.finished().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QuizSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSession")
            .field("question_seconds", &self.inner.question_seconds)
            .field("core", &*self.inner.lock())
            .finish_non_exhaustive()
    }
}

impl QuizSession {
    /// Creates an idle session giving each question `question_seconds`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::ZeroDuration` if `question_seconds` is 0.
    pub fn new(question_seconds: u32, sink: Arc<dyn DisplaySink>) -> Result<Self> {
        if question_seconds == 0 {
            return Err(QuizError::ZeroDuration);
        }
        let (status_tx, _) = watch::channel(SessionStatus::Idle);
        Ok(Self {
            inner: Arc::new(SessionInner {
                core: Mutex::new(SessionCore::default()),
                sink,
                question_seconds,
                status_tx,
            }),
        })
    }

    /// Creates an idle session from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::ZeroDuration` if `question_seconds` is 0.
    pub fn from_config(config: &QuizConfig, sink: Arc<dyn DisplaySink>) -> Result<Self> {
        Self::new(config.question_seconds, sink)
    }

    /// Starts the quiz with the first question of `bank`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyBank` if `bank` has no questions, and
    /// `QuizError::InvalidStateTransition` if the session was already begun.
    /// In both cases the session is left untouched.
    pub fn begin(&self, bank: QuestionBank) -> Result<()> {
        let mut core = self.inner.lock();
        if core.status != SessionStatus::Idle {
            return Err(QuizError::invalid_transition(
                core.status,
                SessionStatus::QuestionActive,
            ));
        }
        if bank.is_empty() {
            return Err(QuizError::EmptyBank);
        }

        tracing::info!(
            questions = bank.len(),
            seconds = self.inner.question_seconds,
            "Quiz session started"
        );
        core.bank = Some(bank);
        core.index = 0;
        core.started_at = Some(Utc::now());

        if let Err(e) = self.inner.activate(&mut core) {
            *core = SessionCore::default();
            return Err(e);
        }
        Ok(())
    }

    /// Submits an answer for the active question.
    ///
    /// Returns `true` if the submission resolved the question. Out-of-range
    /// options count as wrong answers. Returns `false` when no question is
    /// active.
    pub fn submit(&self, selected: usize) -> bool {
        self.accept(None, selected)
    }

    /// Submits an answer for the question at `question_index` only.
    ///
    /// Does nothing and returns `false` if that question is no longer the
    /// active one, so repeated submissions for a question resolve it at most
    /// once.
    pub fn submit_to(&self, question_index: usize, selected: usize) -> bool {
        self.accept(Some(question_index), selected)
    }

    fn accept(&self, question_index: Option<usize>, selected: usize) -> bool {
        let acceptance = {
            let mut core = self.inner.lock();
            let index = question_index.unwrap_or(core.index);
            self.inner.resolve(&mut core, index, Some(selected))
        };

        match acceptance {
            Acceptance::Accepted(superseded) => {
                if let Some(timer) = superseded {
                    timer.cancel();
                }
                true
            }
            Acceptance::Stale => {
                tracing::trace!(?question_index, selected, "Ignoring stale submission");
                false
            }
        }
    }

    /// Stops the active countdown without resolving its question.
    ///
    /// Used when the front end is going away. The session keeps its status;
    /// a later submission still resolves the question, but no expiry will.
    pub fn shutdown(&self) {
        let timer = self.inner.lock().timer.take();
        if let Some(timer) = timer {
            if timer.cancel() {
                tracing::info!("Active countdown stopped on shutdown");
            }
        }
    }

    /// Waits until the session reaches `Finished`.
    pub async fn finished(&self) {
        let mut status = self.subscribe_status();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = status.wait_for(SessionStatus::is_terminal).await;
    }

    /// Subscribes to status changes.
    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status_tx.subscribe()
    }

    /// The active question, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<Question> {
        self.inner.lock().current_question().cloned()
    }

    /// Zero-based index of the active question; equals the bank length once
    /// finished.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.inner.lock().index
    }

    /// Seconds left on the active question, as of the latest tick.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.inner.lock().remaining
    }

    /// Correct answers so far.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.inner.lock().score
    }

    /// Returns `true` once every question has been resolved.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.lock().status.is_terminal()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.lock().status
    }

    /// Number of questions in the bank (0 before `begin`).
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.inner.lock().total()
    }

    /// Countdown given to each question.
    #[must_use]
    pub fn question_seconds(&self) -> u32 {
        self.inner.question_seconds
    }

    /// Outcomes of the questions resolved so far.
    #[must_use]
    pub fn outcomes(&self) -> Vec<QuestionOutcome> {
        self.inner.lock().outcomes.clone()
    }

    /// Consistent copy of the session's progress.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let core = self.inner.lock();
        SessionSnapshot {
            status: core.status,
            current_index: core.index,
            total_questions: core.total(),
            score: core.score,
            remaining_seconds: core.remaining,
            outcomes: core.outcomes.clone(),
            started_at: core.started_at,
            finished_at: core.finished_at,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
