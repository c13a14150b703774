// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A clock that only moves when told to.

use std::sync::Mutex;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use steeple_core::Clock;

pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// A clock at the given local date and hour.
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap_or_default();
        Self::new(now)
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.guard() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.guard();
        *now += by;
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        match self.now.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.guard()
    }
}
