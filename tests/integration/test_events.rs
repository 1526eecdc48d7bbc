//! Integration tests for the render commands a session emits.
//!
//! An `EventBroadcaster` stands in for the display, so every command the
//! session issues can be checked in order.

use std::sync::Arc;
use std::time::Duration;

use quiz_engine::{
    EventBroadcaster, Question, QuestionBank, QuizSession, Resolution, SessionEvent,
};
use tokio::sync::broadcast;
use tokio::time::sleep;

fn bank(correct: &[usize]) -> QuestionBank {
    let questions = correct
        .iter()
        .enumerate()
        .map(|(i, &answer)| {
            Question::new(
                i + 1,
                format!("Question {}?", i + 1),
                vec!["yes".to_string(), "no".to_string()],
                answer,
            )
        })
        .collect();
    QuestionBank::new(questions).expect("valid bank")
}

fn start(seconds: u32, correct: &[usize]) -> (QuizSession, broadcast::Receiver<SessionEvent>) {
    let broadcaster = EventBroadcaster::new(256);
    let receiver = broadcaster.subscribe();
    let session = QuizSession::new(seconds, Arc::new(broadcaster)).expect("valid duration");
    session.begin(bank(correct)).expect("begin");
    (session, receiver)
}

fn drain(receiver: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn shown(ordinal: usize) -> SessionEvent {
    SessionEvent::question_shown(
        ordinal,
        &format!("Question {ordinal}?"),
        &["yes".to_string(), "no".to_string()],
    )
}

fn ticks(from: u32, to: u32) -> impl Iterator<Item = SessionEvent> {
    (to..=from).rev().map(SessionEvent::time_updated)
}

/// A submission at remaining=3 cancels the first countdown; nothing more is
/// heard from it, and the second question runs out on its own.
#[tokio::test(start_paused = true)]
async fn test_event_sequence_with_cancel_and_timeout() {
    let (session, mut receiver) = start(10, &[0, 1]);

    sleep(Duration::from_millis(7500)).await;
    assert_eq!(session.remaining_seconds(), 3);
    assert!(session.submit(0));

    session.finished().await;
    let events = drain(&mut receiver);

    let mut expected = vec![shown(1)];
    expected.extend(ticks(9, 3));
    let first_resolved = expected.len();
    expected.push(shown(2));
    expected.extend(ticks(9, 0));
    let second_resolved = expected.len() + 1;
    expected.push(SessionEvent::session_finished(1, 2));

    // Resolution events carry wall-clock timestamps; check them apart.
    let mut rest = events;
    let second = rest.remove(second_resolved);
    let first = rest.remove(first_resolved);
    assert_eq!(rest, expected);

    assert!(matches!(
        first,
        SessionEvent::QuestionResolved(o)
            if o.ordinal == 1
                && o.remaining_seconds == 3
                && matches!(o.resolution, Resolution::Answered { selected: 0, correct: true })
    ));
    assert!(matches!(
        second,
        SessionEvent::QuestionResolved(o)
            if o.ordinal == 2 && o.remaining_seconds == 0 && o.resolution == Resolution::TimedOut
    ));
}

#[tokio::test(start_paused = true)]
async fn test_no_events_after_finish() {
    let (session, mut receiver) = start(2, &[0]);

    assert!(session.submit(1));
    let events = drain(&mut receiver);
    assert_eq!(events.last(), Some(&SessionEvent::session_finished(0, 1)));

    sleep(Duration::from_secs(10)).await;
    assert!(!session.submit(0));
    assert!(drain(&mut receiver).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_every_subscriber_sees_every_event() {
    let broadcaster = EventBroadcaster::new(64);
    let mut first = broadcaster.subscribe();
    let mut second = broadcaster.subscribe();
    assert_eq!(broadcaster.receiver_count(), 2);

    let session = QuizSession::new(3, Arc::new(broadcaster)).expect("valid duration");
    session.begin(bank(&[0, 0])).expect("begin");
    session.finished().await;

    let first = drain(&mut first);
    assert_eq!(first, drain(&mut second));
    assert_eq!(
        first.iter().filter(|e| e.event_name() == "time_updated").count(),
        6
    );
    assert_eq!(
        first.iter().filter(|e| e.event_name() == "question_resolved").count(),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn test_events_serialize_for_the_wire() {
    let (_session, mut receiver) = start(5, &[0]);
    sleep(Duration::from_millis(1500)).await;

    let lines: Vec<String> = drain(&mut receiver)
        .iter()
        .map(|e| serde_json::to_string(e).expect("serializes"))
        .collect();

    assert_eq!(
        lines,
        vec![
            r#"{"event":"question_shown","payload":{"ordinal":1,"prompt":"Question 1?","options":["yes","no"]}}"#,
            r#"{"event":"time_updated","payload":{"remaining_seconds":4}}"#,
        ]
    );

    let parsed: SessionEvent = serde_json::from_str(&lines[1]).expect("deserializes");
    assert_eq!(parsed, SessionEvent::time_updated(4));
}
