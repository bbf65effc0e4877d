//! Month-end calendar arithmetic.
//!
//! Rebalance dates, month-granularity price samples and fundamental lag
//! cutoffs are all expressed as calendar month-ends.

use chrono::{Datelike, Months};

use crate::types::Date;

/// Last calendar day of the month containing `date`.
#[must_use]
pub fn month_end(date: Date) -> Date {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// First calendar day of the month containing `date`.
#[must_use]
pub fn month_start(date: Date) -> Date {
    date.with_day(1).unwrap_or(date)
}

/// Whether `date` is the last calendar day of its month.
#[must_use]
pub fn is_month_end(date: Date) -> bool {
    month_end(date) == date
}

/// Month-end of the calendar month `months` before the month of `date`.
///
/// `months_back(2024-06-14, 3)` is `2024-03-31`. Returns `None` when the
/// result would underflow chrono's date range.
#[must_use]
pub fn months_back(date: Date, months: u32) -> Option<Date> {
    month_start(date)
        .checked_sub_months(Months::new(months))
        .map(month_end)
}

/// Month-ends from the month of `start` through the month of `end`, taking
/// every `step`-th month.
///
/// Month-ends falling before `start` or after `end` are skipped, so a range
/// starting mid-month begins at that month's end.
#[must_use]
pub fn month_ends(start: Date, end: Date, step: u32) -> Vec<Date> {
    let step = step.max(1);
    let mut dates = Vec::new();
    let mut cursor = month_start(start);
    while cursor <= end {
        let candidate = month_end(cursor);
        if candidate >= start && candidate <= end {
            dates.push(candidate);
        }
        match cursor.checked_add_months(Months::new(step)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    dates
}
