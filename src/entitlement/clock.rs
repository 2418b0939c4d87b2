use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::utils::constants::SECONDS_PER_DAY;

const MILLIS_PER_DAY: i64 = SECONDS_PER_DAY * 1000;

/// Source of "now" for every time window in the engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Calendar-day arithmetic for trial and registration windows.
///
/// Remaining days round up and elapsed days round down, so a trial ending
/// in 2h still reports one day left while an account created 23h ago is
/// zero days old.
pub struct TrialClock;

impl TrialClock {
    pub fn days_remaining(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        let ms = (ends_at - now).num_milliseconds();
        if ms <= 0 {
            return 0;
        }
        (ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }

    pub fn days_since(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        let ms = (now - start).num_milliseconds();
        if ms <= 0 {
            return 0;
        }
        ms / MILLIS_PER_DAY
    }
}
