//! Injected time source.
//!
//! Expiry arithmetic and ledger defaults work on local calendar dates, never
//! on instants, so a membership computed at 23:59 and at 00:01 of the same
//! day agrees. Every "now" read in the domain goes through this trait.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

pub trait Clock: Send + Sync {
    /// Today's date in the gym's local calendar.
    fn today(&self) -> NaiveDate;

    /// Current local wall-clock time of day.
    fn now_time(&self) -> NaiveTime;

    /// Current instant, for timestamp columns.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_time(&self) -> NaiveTime {
        Local::now().time()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock pinned to a fixed date and time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl FixedClock {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            time: NaiveTime::from_hms_opt(10, 30, 0).expect("valid time"),
        }
    }

    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }

    fn now_time(&self) -> NaiveTime {
        self.time
    }

    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.date.and_time(self.time), Utc)
    }
}
