//! Journal service. Loads saved analyses and summarizes them, records guided
//! entries, and moves entries in and out of the journal.

use crate::domain::{
    DomainError, EgoFocus, JournalEntry, JournalStats, ManualEntry, compute_stats,
    entries_with_ego, format_relative,
};
use crate::ports::{ClockPort, JournalPort};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Stats plus display labels for the latest entries, all computed against
/// the same instant.
#[derive(Debug, Clone)]
pub struct JournalOverview {
    pub stats: JournalStats,
    /// `(entry, "Hier")`-style pairs, newest first.
    pub latest: Vec<(JournalEntry, String)>,
}

/// Every entry at one instant, ready to be written out.
#[derive(Debug, Clone)]
pub struct JournalExport {
    pub entries: Vec<JournalEntry>,
    pub exported_at: DateTime<Utc>,
}

impl JournalExport {
    pub fn file_name(&self) -> String {
        format!("egocoach-journal-{}.json", self.exported_at.format("%Y-%m-%d"))
    }
}

pub struct JournalService {
    journal: Arc<dyn JournalPort>,
    clock: Arc<dyn ClockPort>,
}

impl JournalService {
    pub fn new(journal: Arc<dyn JournalPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self { journal, clock }
    }

    pub async fn overview(&self) -> Result<JournalOverview, DomainError> {
        let entries = self.journal.load_entries().await?;
        let now = self.clock.now();
        let stats = compute_stats(&entries, now);
        let latest = stats
            .latest_entries
            .iter()
            .map(|e| (e.clone(), format_relative(e.created_at, now)))
            .collect();

        info!(
            total = stats.total_entries,
            top_ego = stats.top_ego.as_deref().unwrap_or("-"),
            days_since_defensive = ?stats.days_since_defensive,
            "journal stats computed"
        );

        Ok(JournalOverview { stats, latest })
    }

    /// Entries matching `ego` (all of them for `None`), newest first, each with
    /// its relative age.
    pub async fn entries(
        &self,
        ego: Option<EgoFocus>,
    ) -> Result<Vec<(JournalEntry, String)>, DomainError> {
        let entries = self.journal.load_entries().await?;
        let now = self.clock.now();
        Ok(entries_with_ego(&entries, ego)
            .into_iter()
            .map(|e| (e.clone(), format_relative(e.created_at, now)))
            .collect())
    }

    pub async fn record_manual(&self, manual: ManualEntry) -> Result<JournalEntry, DomainError> {
        manual.validate()?;
        let entry = manual.into_journal_entry(format!("entry-{}", Uuid::new_v4()), self.clock.now());
        self.journal.save_entry(&entry).await?;
        info!(id = %entry.id, ego = entry.ego_focus.as_deref().unwrap_or("-"), "manual entry saved");
        Ok(entry)
    }

    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.journal.delete_entry(id).await?;
        info!(id = %id, "journal entry deleted");
        Ok(())
    }

    pub async fn export(&self) -> Result<JournalExport, DomainError> {
        Ok(JournalExport {
            entries: self.journal.load_entries().await?,
            exported_at: self.clock.now(),
        })
    }

    /// Merge previously exported entries. Returns how many were new.
    pub async fn import(&self, entries: Vec<JournalEntry>) -> Result<usize, DomainError> {
        let offered = entries.len();
        let added = self.journal.import_entries(entries).await?;
        info!(offered, added, "journal import merged");
        Ok(added)
    }

    pub async fn clear(&self) -> Result<(), DomainError> {
        self.journal.clear().await?;
        info!("journal cleared");
        Ok(())
    }
}
