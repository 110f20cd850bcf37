//! Time source

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::cell::Cell;

pub trait Clock {
    /// The user's calendar day.
    fn today(&self) -> NaiveDate;
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Clone, Debug)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    /// Noon UTC on the given day.
    pub fn on(day: NaiveDate) -> Self {
        let noon = day.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        Self { now: Cell::new(noon) }
    }

    pub fn set_day(&self, day: NaiveDate) {
        let noon = day.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        self.now.set(noon);
    }

    /// Move forward by whole days.
    pub fn advance_days(&self, days: i64) {
        self.now.set(self.now.get() + chrono::Duration::days(days));
    }

    pub fn advance_millis(&self, millis: i64) {
        self.now.set(self.now.get() + chrono::Duration::milliseconds(millis));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now.get().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
