//! Test helper utilities

use std::sync::Arc;

use chrono::NaiveDate;
use machinatrack_domain::FixedClock;

/// Shorthand for a calendar date; panics on invalid input
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid test date {year}-{month}-{day}"))
}

/// A fixed clock pinned to midnight UTC of the given day
pub fn clock_on(year: i32, month: u32, day: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock::on(date(year, month, day)))
}
