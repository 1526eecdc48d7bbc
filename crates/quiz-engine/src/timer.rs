//! Per-question countdown timer.
//!
//! A [`CountdownTimer`] runs on its own tokio task. Once per second it reports
//! the remaining time through an `on_tick` callback; when the count reaches
//! zero it invokes `on_expire` exactly once and stops.
//!
//! Every callback is delivered while holding the timer's state lock, and
//! [`CountdownTimer::cancel`] takes the same lock. Once `cancel` has returned
//! `true`, no tick and no expiry will ever be delivered for that instance.
//! If expiry was already delivered, `cancel` is a no-op.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::error::{QuizError, Result};

/// Interval between two ticks.
const TICK: Duration = Duration::from_secs(1);

/// Lifecycle of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    /// Counting down.
    Active,
    /// Stopped by [`CountdownTimer::cancel`] before reaching zero.
    Cancelled,
    /// Reached zero and delivered its expiry.
    Expired,
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

#[derive(Debug)]
struct TimerShared {
    state: TimerState,
    remaining: u32,
}

fn lock(shared: &Mutex<TimerShared>) -> MutexGuard<'_, TimerShared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running countdown for a single question.
///
/// Timers are never reused; each question gets a fresh instance. Dropping a
/// timer stops its task.
#[derive(Debug)]
pub struct CountdownTimer {
    shared: Arc<Mutex<TimerShared>>,
    task: JoinHandle<()>,
    duration: u32,
}

impl CountdownTimer {
    /// Starts a countdown of `duration_secs` seconds.
    ///
    /// `on_tick` receives `duration_secs - 1, ..., 1, 0`, one value per
    /// second. The `0` tick and `on_expire` are delivered back to back without
    /// releasing the state lock, so a cancellation can never fall between
    /// them.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::ZeroDuration` if `duration_secs` is 0.
    pub fn start<T, E>(duration_secs: u32, on_tick: T, on_expire: E) -> Result<Self>
    where
        T: FnMut(u32) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        if duration_secs == 0 {
            return Err(QuizError::ZeroDuration);
        }

        let shared = Arc::new(Mutex::new(TimerShared {
            state: TimerState::Active,
            remaining: duration_secs,
        }));
        let task = tokio::spawn(run_countdown(
            Arc::clone(&shared),
            duration_secs,
            on_tick,
            on_expire,
        ));

        tracing::debug!(duration_secs, "Countdown started");
        Ok(Self {
            shared,
            task,
            duration: duration_secs,
        })
    }

    /// Requests termination before expiry.
    ///
    /// Returns `true` if this call stopped an active countdown. Cancelling a
    /// timer that was already cancelled or has expired returns `false` and
    /// changes nothing.
    pub fn cancel(&self) -> bool {
        let mut shared = lock(&self.shared);
        if shared.state != TimerState::Active {
            return false;
        }
        shared.state = TimerState::Cancelled;
        drop(shared);

        self.task.abort();
        tracing::debug!(duration_secs = self.duration, "Countdown cancelled");
        true
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TimerState {
        lock(&self.shared).state
    }

    /// Seconds left as of the latest delivered tick.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        lock(&self.shared).remaining
    }

    /// The duration this countdown was started with.
    #[must_use]
    pub const fn duration_seconds(&self) -> u32 {
        self.duration
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        // May run inside `on_expire` while the state lock is held, so only
        // the task is touched here.
        self.task.abort();
    }
}

async fn run_countdown<T, E>(
    shared: Arc<Mutex<TimerShared>>,
    duration_secs: u32,
    mut on_tick: T,
    on_expire: E,
) where
    T: FnMut(u32),
    E: FnOnce(),
{
    let mut on_expire = Some(on_expire);
    let mut deadline = Instant::now();

    for remaining in (0..duration_secs).rev() {
        deadline += TICK;
        sleep_until(deadline).await;

        if !deliver(&shared, remaining, &mut on_tick, &mut on_expire) {
            return;
        }
    }
}

/// Delivers one tick (and the expiry on the last one).
///
/// Returns `false` once the countdown must stop.
fn deliver<T, E>(
    shared: &Mutex<TimerShared>,
    remaining: u32,
    on_tick: &mut T,
    on_expire: &mut Option<E>,
) -> bool
where
    T: FnMut(u32),
    E: FnOnce(),
{
    let mut guard = lock(shared);
    if guard.state != TimerState::Active {
        return false;
    }

    guard.remaining = remaining;
    on_tick(remaining);

    if remaining == 0 {
        guard.state = TimerState::Expired;
        if let Some(on_expire) = on_expire.take() {
            on_expire();
        }
        return false;
    }
    true
}
