//! Simulation clock — host-advanced simulated time.
//!
//! The engine never reads the wall clock. The host sets a start time,
//! then advances the clock as its own scheduler fires; every engine
//! operation that needs a timestamp reads it from here.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    now: DateTime<Utc>,
}

impl SimClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// A fixed, boring epoch for tests and seeded runs.
    pub fn at_epoch() -> Self {
        Self {
            now: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn advance_hours(&mut self, hours: i64) -> DateTime<Utc> {
        self.now += Duration::hours(hours);
        self.now
    }

    pub fn advance_days(&mut self, days: i64) -> DateTime<Utc> {
        self.now += Duration::days(days);
        self.now
    }

    pub fn set(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }
}
