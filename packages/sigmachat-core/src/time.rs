//! Wall-clock helpers for certificate validity and message timestamps.

use chrono::{DateTime, Months, Utc};

/// Returns the current UTC time.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Adds calendar months to a timestamp, saturating at the maximum
/// representable time.
pub fn add_months(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
