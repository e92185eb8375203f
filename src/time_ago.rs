//! Elapsed-time labels.

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Label for a stored Unix time relative to `now`, dates in local time.
pub fn time_ago(stored: f64, now: f64) -> String {
    time_ago_in(stored, now, &Local)
}

/// [`time_ago`] with an explicit time zone for the calendar form.
///
/// Anything under a minute, including times in the future, is `1 mins ago`.
/// From one week on the label is the stored calendar date.
#[allow(clippy::cast_possible_truncation)]
pub fn time_ago_in<Tz: TimeZone>(stored: f64, now: f64, tz: &Tz) -> String {
    let delta = (now - stored) as i64;
    match delta {
        d if d < MINUTE => "1 mins ago".to_string(),
        d if d < HOUR => format!("{} mins ago", d / MINUTE),
        d if d < DAY => format!("{} hours ago", d / HOUR),
        d if d < WEEK => format!("{} days ago", d / DAY),
        _ => match to_datetime(stored) {
            Some(utc) => {
                let date = utc.with_timezone(tz);
                format!(
                    "{} year {} month {} day ago",
                    date.year(),
                    date.month(),
                    date.day()
                )
            }
            None => format!("{} days ago", delta / DAY),
        },
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_datetime(epoch: f64) -> Option<DateTime<Utc>> {
    let secs = epoch.floor();
    let nanos = ((epoch - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}
