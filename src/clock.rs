//! Time source and sleep used by the workflow
//!
//! Extraction backoff suspends a run for minutes at a time. Routing both "what time
//! is it" and "wait this long" through [`Clock`] lets tests observe the waits the
//! workflow asked for without spending them.

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use std::sync::Mutex;
use std::time::Duration;

/// Source of wall-clock time and suspension
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);

    /// Current local time, used for dated folder names and conflict suffixes
    fn local_now(&self) -> DateTime<Local> {
        self.now().with_timezone(&Local)
    }
}

/// Production clock backed by the system time and tokio timers
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock with a fixed start time that advances only when slept on
///
/// Every requested sleep is recorded, so callers can assert on the backoff a
/// workflow asked for without waiting for it.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Create a clock that reports `now` until slept on
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|n| *n).unwrap_or_else(|_| Utc::now())
    }

    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        if let Ok(mut now) = self.now.lock()
            && let Ok(delta) = chrono::Duration::from_std(duration)
        {
            *now += delta;
        }
        tokio::task::yield_now().await;
    }
}
