//! Render commands emitted by a session, and a broadcasting sink for them.
//!
//! The session controller never renders anything itself. It drives a
//! [`DisplaySink`] on every state transition; the sink decides how (or
//! whether) to show it.
//!
//! [`EventBroadcaster`] is a sink that turns each render command into a
//! serializable [`SessionEvent`] and publishes it on a tokio broadcast
//! channel, so several observers can follow one session.
//!
//! # Example
//!
//! ```
//! use quiz_engine::display::{DisplaySink, EventBroadcaster, SessionEvent};
//!
//! # async fn example() {
//! let broadcaster = EventBroadcaster::new(16);
//! let mut receiver = broadcaster.subscribe();
//!
//! broadcaster.on_time_updated(7);
//!
//! if let Ok(SessionEvent::TimeUpdated(payload)) = receiver.recv().await {
//!     assert_eq!(payload.remaining_seconds, 7);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::QuestionOutcome;

/// Consumer of session render commands.
///
/// Methods are called while the session holds its internal lock, in the
/// order the transitions happen. Implementations must return promptly and
/// must not call back into the session.
pub trait DisplaySink: Send + Sync {
    /// A question became active.
    fn on_question_shown(&self, ordinal: usize, prompt: &str, options: &[String]);

    /// The active question's countdown ticked.
    fn on_time_updated(&self, remaining_seconds: u32);

    /// A question was resolved by a submission or by expiry.
    fn on_question_resolved(&self, _outcome: &QuestionOutcome) {}

    /// The session reached its terminal state.
    fn on_session_finished(&self, final_score: u32, total_questions: usize);
}

// ============================================================================
// Event Payloads
// ============================================================================

/// Payload for the `question_shown` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionShownPayload {
    /// 1-based position of the question.
    pub ordinal: usize,
    /// The question text.
    pub prompt: String,
    /// The answer options.
    pub options: Vec<String>,
}

/// Payload for the `time_updated` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeUpdatedPayload {
    /// Seconds left on the active question.
    pub remaining_seconds: u32,
}

/// Payload for the `session_finished` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFinishedPayload {
    /// Number of correctly answered questions.
    pub final_score: u32,
    /// Number of questions in the bank.
    pub total_questions: usize,
}

// ============================================================================
// Event Enum
// ============================================================================

/// Serializable form of the render commands.
///
/// Serialized as JSON objects with "event" and "payload" fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A question became active.
    QuestionShown(QuestionShownPayload),
    /// The active countdown ticked.
    TimeUpdated(TimeUpdatedPayload),
    /// A question was resolved.
    QuestionResolved(QuestionOutcome),
    /// The session finished.
    SessionFinished(SessionFinishedPayload),
}

impl SessionEvent {
    /// Creates a `QuestionShown` event.
    #[must_use]
    pub fn question_shown(ordinal: usize, prompt: &str, options: &[String]) -> Self {
        Self::QuestionShown(QuestionShownPayload {
            ordinal,
            prompt: prompt.to_string(),
            options: options.to_vec(),
        })
    }

    /// Creates a `TimeUpdated` event.
    #[must_use]
    pub const fn time_updated(remaining_seconds: u32) -> Self {
        Self::TimeUpdated(TimeUpdatedPayload { remaining_seconds })
    }

    /// Creates a `SessionFinished` event.
    #[must_use]
    pub const fn session_finished(final_score: u32, total_questions: usize) -> Self {
        Self::SessionFinished(SessionFinishedPayload {
            final_score,
            total_questions,
        })
    }

    /// Returns the event name as a string.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::QuestionShown(_) => "question_shown",
            Self::TimeUpdated(_) => "time_updated",
            Self::QuestionResolved(_) => "question_resolved",
            Self::SessionFinished(_) => "session_finished",
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Publishes session events to every subscriber.
///
/// Uses a tokio broadcast channel; events sent while nobody is subscribed are
/// dropped.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster whose subscribers buffer up to `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new subscriber.
    ///
    /// A subscriber that falls more than `capacity` events behind receives a
    /// `Lagged` error and misses the oldest events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Broadcasts an event, returning how many subscribers will see it.
    pub fn send(&self, event: SessionEvent) -> usize {
        // Err only means there are no receivers.
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

impl DisplaySink for EventBroadcaster {
    fn on_question_shown(&self, ordinal: usize, prompt: &str, options: &[String]) {
        self.send(SessionEvent::question_shown(ordinal, prompt, options));
    }

    fn on_time_updated(&self, remaining_seconds: u32) {
        self.send(SessionEvent::time_updated(remaining_seconds));
    }

    fn on_question_resolved(&self, outcome: &QuestionOutcome) {
        self.send(SessionEvent::QuestionResolved(outcome.clone()));
    }

    fn on_session_finished(&self, final_score: u32, total_questions: usize) {
        self.send(SessionEvent::session_finished(final_score, total_questions));
    }
}
