//! Patient-facing rendering of dates, times and amounts.
//!
//! Every document and listing goes through these helpers so the date in a
//! prescription body always matches the date in its download filename.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%d %b %Y";
pub const TIME_FORMAT: &str = "%I:%M %p";

/// Calendar date of `timestamp` as seen in the clinic's offset, e.g. `05 Mar 2024`.
pub fn format_date(timestamp: &DateTime<Utc>, offset: &FixedOffset) -> String {
    timestamp.with_timezone(offset).format(DATE_FORMAT).to_string()
}

pub fn format_naive_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Wall-clock time in the clinic's offset, e.g. `09:30 AM`.
pub fn format_time(timestamp: &DateTime<Utc>, offset: &FixedOffset) -> String {
    timestamp.with_timezone(offset).format(TIME_FORMAT).to_string()
}

/// Rupee amount; whole amounts drop the paise.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("₹{:.0}", amount)
    } else {
        format!("₹{:.2}", amount)
    }
}
