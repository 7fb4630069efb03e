//! Journal statistics. Single pass for counts, one filter for the last
//! defensive entry. The input slice is never reordered.

use crate::domain::entities::{EgoFocus, JournalEntry, JournalStats};
use crate::domain::relative_time::whole_days_between;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Label counted for entries saved without an ego focus.
pub const UNDEFINED_EGO: &str = "Indéfini";

/// How many recent entries the stats carry for display.
pub const LATEST_ENTRIES: usize = 3;

pub fn compute_stats(entries: &[JournalEntry], now: DateTime<Utc>) -> JournalStats {
    let total_entries = entries.len();

    // label -> (count, first index)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        let label = entry.ego_focus.as_deref().unwrap_or(UNDEFINED_EGO);
        counts.entry(label).or_insert((0, idx)).0 += 1;
    }

    let top = counts
        .iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            // Higher count wins; equal counts prefer the earlier first appearance.
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(label, (count, _))| (label.to_string(), *count));

    let top_ego_percentage = match &top {
        Some((_, count)) if total_entries > 0 => {
            ((*count as f64 / total_entries as f64) * 100.0).round() as u32
        }
        _ => 0,
    };

    let defensive = EgoFocus::Defensive.label();
    let days_since_defensive = entries
        .iter()
        .filter(|e| e.ego_focus.as_deref() == Some(defensive))
        .map(|e| e.created_at)
        .max()
        .map(|last| whole_days_between(last, now));

    let mut latest: Vec<&JournalEntry> = entries.iter().collect();
    latest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let latest_entries = latest
        .into_iter()
        .take(LATEST_ENTRIES)
        .cloned()
        .collect();

    JournalStats {
        total_entries,
        top_ego: top.map(|(label, _)| label),
        top_ego_percentage,
        days_since_defensive,
        latest_entries,
    }
}

/// Entries logged with exactly `ego`, in their stored order. `None` keeps
/// everything.
pub fn entries_with_ego(entries: &[JournalEntry], ego: Option<EgoFocus>) -> Vec<&JournalEntry> {
    entries
        .iter()
        .filter(|e| ego.is_none_or(|ego| e.ego_focus.as_deref() == Some(ego.label())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()
    }

    fn entry(id: &str, ego: Option<&str>, hours_ago: i64) -> JournalEntry {
        JournalEntry::new(id, ego, now() - Duration::hours(hours_ago))
    }

    #[test]
    fn test_defensive_today() {
        let entries = vec![
            entry("1", Some("La Défensive"), 0),
            entry("2", Some("La Défensive"), 24),
            entry("3", Some("Le Sauveur"), 0),
        ];
        let stats = compute_stats(&entries, now());
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.top_ego.as_deref(), Some("La Défensive"));
        assert_eq!(stats.days_since_defensive, Some(0));
        assert_eq!(stats.top_ego_percentage, 67);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let entries = vec![
            entry("1", Some("Le Martyr"), 5),
            entry("2", Some("Le Sauveur"), 4),
            entry("3", Some("Le Sauveur"), 3),
            entry("4", Some("Le Martyr"), 2),
        ];
        let stats = compute_stats(&entries, now());
        assert_eq!(stats.top_ego.as_deref(), Some("Le Martyr"));
        assert_eq!(stats.top_ego_percentage, 50);
    }

    #[test]
    fn test_most_recent_defensive_regardless_of_order() {
        let entries = vec![
            entry("old", Some("La Défensive"), 24 * 10),
            entry("recent", Some("La Défensive"), 24 * 3 + 5),
        ];
        let stats = compute_stats(&entries, now());
        assert_eq!(stats.days_since_defensive, Some(3));
        assert_eq!(stats.last_entry().map(|e| e.id.as_str()), Some("recent"));
    }

    #[test]
    fn test_no_defensive_entry() {
        let entries = vec![entry("1", Some("Le Sauveur"), 1)];
        let stats = compute_stats(&entries, now());
        assert_eq!(stats.days_since_defensive, None);
    }

    #[test]
    fn test_label_must_match_exactly() {
        let entries = vec![entry("1", Some("Défensive"), 1)];
        assert_eq!(compute_stats(&entries, now()).days_since_defensive, None);
    }

    #[test]
    fn test_missing_ego_counts_as_undefined() {
        let entries = vec![entry("1", None, 1), entry("2", None, 2)];
        let stats = compute_stats(&entries, now());
        assert_eq!(stats.top_ego.as_deref(), Some(UNDEFINED_EGO));
    }

    #[test]
    fn test_empty_journal() {
        let stats = compute_stats(&[], now());
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.top_ego, None);
        assert_eq!(stats.top_ego_percentage, 0);
        assert_eq!(stats.days_since_defensive, None);
        assert!(stats.last_entry().is_none());
    }

    #[test]
    fn test_future_defensive_clamps_to_zero() {
        let entries = vec![entry("1", Some("La Défensive"), -30)];
        assert_eq!(compute_stats(&entries, now()).days_since_defensive, Some(0));
    }

    #[test]
    fn test_latest_entries_capped_and_input_untouched() {
        let entries: Vec<_> = (0..5)
            .map(|i| entry(&i.to_string(), Some("Le Martyr"), 10 - i))
            .collect();
        let before = entries.clone();
        let stats = compute_stats(&entries, now());
        let ids: Vec<_> = stats.latest_entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "3", "2"]);
        assert_eq!(entries, before);
    }

    #[test]
    fn test_entries_with_ego() {
        let entries = vec![
            entry("a", Some("Le Martyr"), 1),
            entry("b", None, 2),
            entry("c", Some("Le Martyr"), 3),
            entry("d", Some("Le Martyre"), 4),
        ];
        let ids = |found: Vec<&JournalEntry>| found.iter().map(|e| e.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(entries_with_ego(&entries, Some(EgoFocus::Martyr))), vec!["a", "c"]);
        assert!(entries_with_ego(&entries, Some(EgoFocus::Saviour)).is_empty());
        assert_eq!(entries_with_ego(&entries, None).len(), 4);
    }
}
