//! Weekly calendar helpers
//!
//! Every helper returns `None` instead of overflowing past `NaiveDate::MAX`.

use std::iter::successors;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// First Sunday on or after `start`
pub fn first_week(start: NaiveDate) -> Option<NaiveDate> {
    let offset = (7 - start.weekday().num_days_from_sunday()) % 7;
    start.checked_add_signed(Duration::days(i64::from(offset)))
}

/// `count` consecutive Sunday-anchored week dates from `start`
pub fn weekly_dates(start: NaiveDate, count: usize) -> Option<Vec<NaiveDate>> {
    let weeks: Vec<NaiveDate> = successors(first_week(start), |week| next_week(*week))
        .take(count)
        .collect();
    (weeks.len() == count).then_some(weeks)
}

/// Week following `week`
pub fn next_week(week: NaiveDate) -> Option<NaiveDate> {
    week.checked_add_signed(Duration::weeks(1))
}

pub fn is_week_anchor(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}
