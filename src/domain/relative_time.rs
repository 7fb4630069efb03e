//! Relative age labels ("Aujourd'hui", "Hier", "Il y a N jours").

use chrono::{DateTime, Utc};

/// Whole 24h periods elapsed from `from` to `to`, floored. Instants after `to`
/// count as 0.
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    // num_days truncates toward zero, which is the floor for non-negative spans.
    (to - from).num_days().max(0)
}

/// Label for the age of `instant` as seen at `now`.
pub fn format_relative(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match whole_days_between(instant, now) {
        0 => "Aujourd'hui".to_string(),
        1 => "Hier".to_string(),
        days => format!("Il y a {} jours", days),
    }
}
