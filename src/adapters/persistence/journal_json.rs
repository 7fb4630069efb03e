//! Implements JournalPort using a JSON file per user.
//!
//! Layout: `{data_dir}/ego-coach-data/{user_id}/journal.json`, holding a JSON
//! array of entries, newest first.

use crate::domain::{DomainError, JournalEntry};
use crate::ports::JournalPort;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Top-level directory shared by every user namespace.
pub const NAMESPACE: &str = "ego-coach-data";

const JOURNAL_FILE: &str = "journal.json";

/// JSON file-based journal storage.
pub struct JournalJson {
    path: PathBuf,
    cache: tokio::sync::RwLock<Vec<JournalEntry>>,
}

impl JournalJson {
    /// Journal of `user_id` under `data_dir`. The id becomes a directory name,
    /// so it must be a single non-empty path component.
    pub fn for_user(data_dir: impl AsRef<Path>, user_id: &str) -> Result<Self, DomainError> {
        let valid = !user_id.is_empty()
            && user_id != "."
            && user_id != ".."
            && !user_id.contains(['/', '\\']);
        if !valid {
            return Err(DomainError::Config(format!(
                "invalid user id for journal namespace: {:?}",
                user_id
            )));
        }
        Ok(Self {
            path: data_dir
                .as_ref()
                .join(NAMESPACE)
                .join(user_id)
                .join(JOURNAL_FILE),
            cache: tokio::sync::RwLock::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the journal from disk. A missing file is an empty journal; a file
    /// that is not a list of entries is rejected.
    pub async fn load(&self) -> Result<(), DomainError> {
        let entries = match fs::read_to_string(&self.path).await {
            Ok(s) => parse_entries(&s)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(DomainError::Journal(format!("read journal: {}", e))),
        };
        info!(
            path = %self.path.display(),
            entries = entries.len(),
            "journal loaded"
        );
        *self.cache.write().await = entries;
        Ok(())
    }

    /// Atomic save: write temp file, sync, rename over the target.
    async fn save(&self, entries: &[JournalEntry]) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| DomainError::Journal(e.to_string()))?;

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| DomainError::Journal(format!("create journal dir: {}", e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Journal(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Journal(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Journal(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Journal(format!("atomic rename failed: {}", e)))?;

        debug!(path = %self.path.display(), entries = entries.len(), "journal saved");
        Ok(())
    }
}

/// Parse a journal document. Anything but an array of entries is an error.
pub fn parse_entries(raw: &str) -> Result<Vec<JournalEntry>, DomainError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| DomainError::InvalidInput(format!("journal is not a list of entries: {}", e)))
}

/// Write `entries` to `path` as a pretty JSON list, the same shape as the
/// journal file, so any journal file can be imported back.
pub async fn write_export(path: &Path, entries: &[JournalEntry]) -> Result<(), DomainError> {
    let json =
        serde_json::to_string_pretty(entries).map_err(|e| DomainError::Journal(e.to_string()))?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::Journal(format!("create export dir: {}", e)))?;
    }
    fs::write(path, json)
        .await
        .map_err(|e| DomainError::Journal(format!("write export: {}", e)))?;
    info!(path = %path.display(), entries = entries.len(), "journal exported");
    Ok(())
}

/// Read an exported journal. Unlike `load`, a missing file is an error.
pub async fn read_export(path: &Path) -> Result<Vec<JournalEntry>, DomainError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::Journal(format!("read export {}: {}", path.display(), e)))?;
    parse_entries(&raw)
}

#[async_trait::async_trait]
impl JournalPort for JournalJson {
    async fn load_entries(&self) -> Result<Vec<JournalEntry>, DomainError> {
        Ok(self.cache.read().await.clone())
    }

    async fn save_entry(&self, entry: &JournalEntry) -> Result<(), DomainError> {
        let mut cache = self.cache.write().await;
        let mut next = Vec::with_capacity(cache.len() + 1);
        next.push(entry.clone());
        next.extend(cache.iter().cloned());
        self.save(&next).await?;
        *cache = next;
        Ok(())
    }

    async fn delete_entry(&self, id: &str) -> Result<(), DomainError> {
        let mut cache = self.cache.write().await;
        let next: Vec<JournalEntry> = cache.iter().filter(|e| e.id != id).cloned().collect();
        if next.len() == cache.len() {
            return Err(DomainError::EntryNotFound(id.to_string()));
        }
        self.save(&next).await?;
        *cache = next;
        Ok(())
    }

    async fn import_entries(&self, entries: Vec<JournalEntry>) -> Result<usize, DomainError> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        let mut known: HashSet<String> = next.iter().map(|e| e.id.clone()).collect();
        let mut added = 0;
        for entry in entries {
            if entry.id.is_empty() || entry.summary.is_empty() {
                continue;
            }
            if known.insert(entry.id.clone()) {
                next.push(entry);
                added += 1;
            }
        }
        next.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.save(&next).await?;
        *cache = next;
        Ok(added)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut cache = self.cache.write().await;
        self.save(&[]).await?;
        cache.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(id: &str, hours_ago: i64) -> JournalEntry {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        JournalEntry::new(id, Some("Le Martyr"), base - Duration::hours(hours_ago))
    }

    fn summarized(id: &str, hours_ago: i64) -> JournalEntry {
        JournalEntry {
            summary: format!("Analyse {id}"),
            ..entry(id, hours_ago)
        }
    }

    #[tokio::test]
    async fn test_export_then_import_into_other_user() {
        let dir = tempfile::tempdir().unwrap();
        let alice = JournalJson::for_user(dir.path(), "alice").unwrap();
        alice.save_entry(&summarized("a1", 2)).await.unwrap();
        alice.save_entry(&summarized("a2", 1)).await.unwrap();

        let export = dir.path().join("exports").join("alice.json");
        write_export(&export, &alice.load_entries().await.unwrap())
            .await
            .unwrap();

        let bob = JournalJson::for_user(dir.path(), "bob").unwrap();
        let added = bob.import_entries(read_export(&export).await.unwrap()).await.unwrap();
        assert_eq!(added, 2);
        assert_eq!(bob.load_entries().await.unwrap(), alice.load_entries().await.unwrap());

        let again = bob.import_entries(read_export(&export).await.unwrap()).await.unwrap();
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn test_read_export_rejects_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            read_export(&missing).await,
            Err(DomainError::Journal(_))
        ));

        let object = dir.path().join("object.json");
        std::fs::write(&object, r#"{"id": "a"}"#).unwrap();
        assert!(matches!(
            read_export(&object).await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    /// A regular file where the data directory should be makes every write fail.
    fn unwritable_journal(dir: &std::path::Path) -> JournalJson {
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        JournalJson::for_user(&blocker, "default").unwrap()
    }

    #[tokio::test]
    async fn test_failed_save_keeps_cache_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let journal = unwritable_journal(dir.path());

        assert!(journal.save_entry(&entry("ghost", 0)).await.is_err());
        assert!(journal.load_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_clear_keeps_entries() {
        let dir = tempfile::tempdir().unwrap();
        let journal = JournalJson::for_user(dir.path(), "default").unwrap();
        journal.save_entry(&entry("kept", 0)).await.unwrap();

        // Swap the journal file's directory for a plain file so the next write fails.
        let user_dir = journal.path().parent().unwrap().to_path_buf();
        std::fs::remove_dir_all(&user_dir).unwrap();
        std::fs::write(&user_dir, "x").unwrap();

        assert!(journal.clear().await.is_err());
        assert_eq!(journal.load_entries().await.unwrap().len(), 1);
        assert!(journal.delete_entry("kept").await.is_err());
        assert_eq!(journal.load_entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let dir = tempfile::tempdir().unwrap();
        let journal = JournalJson::for_user(dir.path(), "default").unwrap();
        journal.save_entry(&entry("a", 2)).await.unwrap();
        journal.save_entry(&entry("b", 1)).await.unwrap();

        journal.delete_entry("a").await.unwrap();

        let reopened = JournalJson::for_user(dir.path(), "default").unwrap();
        reopened.load().await.unwrap();
        let ids: Vec<_> = reopened
            .load_entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_entry() {
        let dir = tempfile::tempdir().unwrap();
        let journal = JournalJson::for_user(dir.path(), "default").unwrap();
        journal.save_entry(&entry("a", 0)).await.unwrap();

        let err = journal.delete_entry("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::EntryNotFound(id) if id == "missing"));
        assert_eq!(journal.load_entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_merges_sorts_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let journal = JournalJson::for_user(dir.path(), "default").unwrap();
        journal.save_entry(&summarized("existing", 5)).await.unwrap();

        let added = journal
            .import_entries(vec![
                summarized("existing", 5),
                summarized("newer", 1),
                summarized("older", 10),
                entry("no-summary", 3),
                summarized("", 2),
            ])
            .await
            .unwrap();

        assert_eq!(added, 2);
        let ids: Vec<_> = journal
            .load_entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["newer", "existing", "older"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_journal() {
        let dir = tempfile::tempdir().unwrap();
        let journal = JournalJson::for_user(dir.path(), "default").unwrap();
        journal.load().await.unwrap();
        assert!(journal.load_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_reload_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let journal = JournalJson::for_user(dir.path(), "alice").unwrap();
        journal.load().await.unwrap();
        journal.save_entry(&entry("first", 2)).await.unwrap();
        journal.save_entry(&entry("second", 1)).await.unwrap();

        assert!(
            journal
                .path()
                .ends_with("ego-coach-data/alice/journal.json")
        );

        let reopened = JournalJson::for_user(dir.path(), "alice").unwrap();
        reopened.load().await.unwrap();
        let ids: Vec<_> = reopened
            .load_entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let alice = JournalJson::for_user(dir.path(), "alice").unwrap();
        alice.save_entry(&entry("a", 0)).await.unwrap();

        let bob = JournalJson::for_user(dir.path(), "bob").unwrap();
        bob.load().await.unwrap();
        assert!(bob.load_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let journal = JournalJson::for_user(dir.path(), "default").unwrap();
        journal.save_entry(&entry("a", 0)).await.unwrap();
        journal.clear().await.unwrap();
        journal.load().await.unwrap();
        assert!(journal.load_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let journal = JournalJson::for_user(dir.path(), "default").unwrap();
        std::fs::create_dir_all(journal.path().parent().unwrap()).unwrap();
        std::fs::write(journal.path(), r#"{"egoFocus": "La Défensive"}"#).unwrap();

        let err = journal.load().await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_entries_accepts_original_shape() {
        let raw = r#"[
            {"id": "analysis-1", "createdAt": "2023-01-01T10:00:00Z", "egoFocus": "La Défensive"},
            {"id": "analysis-2", "createdAt": "2022-12-31T12:00:00.000Z"}
        ]"#;
        let entries = parse_entries(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ego_focus.as_deref(), Some("La Défensive"));
        assert_eq!(entries[1].ego_focus, None);
    }

    #[test]
    fn test_parse_entries_rejects_wrong_types() {
        let raw = r#"[{"id": "x", "createdAt": "yesterday", "egoFocus": 3}]"#;
        assert!(matches!(parse_entries(raw), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_user_id_must_be_one_component() {
        assert!(JournalJson::for_user("/tmp", "").is_err());
        assert!(JournalJson::for_user("/tmp", "../etc").is_err());
        assert!(JournalJson::for_user("/tmp", "..").is_err());
        assert!(JournalJson::for_user("/tmp", "default").is_ok());
    }
}
