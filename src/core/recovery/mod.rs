//! # Recovery Module
//!
//! Append-only record of every file a run wrote into an archive.
//!
//! The log lives at `<base>/recovery_log.json` and is shared by all albums
//! under that base. Entries are never rewritten, so the log can be used to
//! reconstruct what happened or to [`undo_run`] a run.

mod undo;

pub use undo::{undo_run, UndoReport};

use crate::core::digest::ContentDigest;
use crate::core::organize::{Area, OperationMode};
use crate::core::store;
use crate::error::StoreError;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name of the recovery log inside the destination base
pub const RECOVERY_LOG_FILE: &str = "recovery_log.json";

/// One file written into the archive.
///
/// Logs written by older tools only carry the first four fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryLogEntry {
    #[serde(rename = "original")]
    pub original_path: PathBuf,
    #[serde(rename = "destination")]
    pub destination_path: PathBuf,
    /// Local time the file was written
    pub timestamp: NaiveDateTime,
    pub album: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Area>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<ContentDigest>,
}

impl RecoveryLogEntry {
    /// Entry stamped with the current local time
    pub fn now(original_path: &Path, destination_path: &Path, album: &str) -> Self {
        Self {
            original_path: original_path.to_path_buf(),
            destination_path: destination_path.to_path_buf(),
            timestamp: Local::now().naive_local(),
            album: album.to_string(),
            run_id: None,
            area: None,
            operation: None,
            digest: None,
        }
    }
}

/// The recovery log of one destination base
#[derive(Debug)]
pub struct RecoveryLog {
    path: PathBuf,
    entries: Vec<RecoveryLogEntry>,
}

impl RecoveryLog {
    /// Open the log under `base`. A missing log is empty; a corrupted one is
    /// an error.
    pub fn open(base: &Path) -> Result<Self, StoreError> {
        Self::open_file(&base.join(RECOVERY_LOG_FILE))
    }

    pub fn open_file(path: &Path) -> Result<Self, StoreError> {
        let entries = store::read_json(path)?.unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[RecoveryLogEntry] {
        &self.entries
    }

    /// Append an entry and rewrite the file.
    ///
    /// The entry is kept in memory even if the write fails, so the next
    /// successful append persists it too.
    pub fn append(&mut self, entry: RecoveryLogEntry) -> Result<(), StoreError> {
        self.entries.push(entry);
        store::write_json(&self.path, &self.entries)
    }

    /// Entries written by one run, in the order they were written
    pub fn entries_for_run<'a>(
        &'a self,
        run_id: &'a str,
    ) -> impl Iterator<Item = &'a RecoveryLogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.run_id.as_deref() == Some(run_id))
    }

    /// Sources already placed into `album` whose copy is still on disk
    pub fn placed_sources(&self, album: &str) -> HashSet<PathBuf> {
        self.entries
            .iter()
            .filter(|e| e.album == album && e.destination_path.exists())
            .map(|e| e.original_path.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_log_is_empty() {
        let temp = TempDir::new().unwrap();
        let log = RecoveryLog::open(temp.path()).unwrap();
        assert!(log.entries().is_empty());
        assert_eq!(log.path(), temp.path().join(RECOVERY_LOG_FILE));
    }

    #[test]
    fn appends_survive_reopening() {
        let temp = TempDir::new().unwrap();
        let mut log = RecoveryLog::open(temp.path()).unwrap();
        log.append(RecoveryLogEntry::now(
            Path::new("/src/a.jpg"),
            &temp.path().join("Family/2024/08/a.jpg"),
            "Family",
        ))
        .unwrap();
        log.append(RecoveryLogEntry::now(
            Path::new("/src/b.jpg"),
            &temp.path().join("Family/2024/08/b.jpg"),
            "Family",
        ))
        .unwrap();

        let reopened = RecoveryLog::open(temp.path()).unwrap();
        let originals: Vec<_> = reopened
            .entries()
            .iter()
            .map(|e| e.original_path.clone())
            .collect();
        assert_eq!(
            originals,
            vec![PathBuf::from("/src/a.jpg"), PathBuf::from("/src/b.jpg")]
        );
    }

    #[test]
    fn reads_logs_without_supplemental_fields() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(RECOVERY_LOG_FILE),
            r#"[{"original": "/src/a.jpg", "destination": "/out/a.jpg",
                 "timestamp": "2024-08-01T10:15:30.123456", "album": "Scans"}]"#,
        )
        .unwrap();

        let log = RecoveryLog::open(temp.path()).unwrap();
        assert_eq!(log.entries()[0].album, "Scans");
        assert!(log.entries()[0].run_id.is_none());
    }

    #[test]
    fn corrupted_log_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(RECOVERY_LOG_FILE), "not json").unwrap();
        assert!(matches!(
            RecoveryLog::open(temp.path()),
            Err(StoreError::Corrupted { .. })
        ));
    }

    #[test]
    fn placed_sources_require_destination_on_disk() {
        let temp = TempDir::new().unwrap();
        let kept = temp.path().join("kept.jpg");
        fs::write(&kept, b"x").unwrap();

        let mut log = RecoveryLog::open(temp.path()).unwrap();
        log.append(RecoveryLogEntry::now(Path::new("/src/kept.jpg"), &kept, "A"))
            .unwrap();
        log.append(RecoveryLogEntry::now(
            Path::new("/src/gone.jpg"),
            &temp.path().join("gone.jpg"),
            "A",
        ))
        .unwrap();
        log.append(RecoveryLogEntry::now(Path::new("/src/other.jpg"), &kept, "B"))
            .unwrap();

        let placed = log.placed_sources("A");
        assert!(placed.contains(Path::new("/src/kept.jpg")));
        assert!(!placed.contains(Path::new("/src/gone.jpg")));
        assert!(!placed.contains(Path::new("/src/other.jpg")));
    }

    #[test]
    fn entries_for_run_filters_by_id() {
        let temp = TempDir::new().unwrap();
        let mut log = RecoveryLog::open(temp.path()).unwrap();
        for (run, name) in [("r1", "a"), ("r2", "b"), ("r1", "c")] {
            let mut entry =
                RecoveryLogEntry::now(Path::new(name), &temp.path().join(name), "A");
            entry.run_id = Some(run.to_string());
            log.append(entry).unwrap();
        }

        let names: Vec<_> = log
            .entries_for_run("r1")
            .map(|e| e.original_path.clone())
            .collect();
        assert_eq!(names, vec![PathBuf::from("a"), PathBuf::from("c")]);
    }
}
