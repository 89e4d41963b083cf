//! JSON-file storage for scan history.

use super::types::{ScanHistoryEntry, ScanHistoryResult};
use crate::core::store;
use crate::error::StoreError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File name of the history inside the destination base
pub const SCAN_HISTORY_FILE: &str = "scan_history.json";

/// Repository for scan history operations
pub struct HistoryRepository {
    path: PathBuf,
    entries: Vec<ScanHistoryEntry>,
}

impl HistoryRepository {
    /// Open the history under a destination base
    pub fn open(base: &Path) -> Result<Self, StoreError> {
        Self::open_file(&base.join(SCAN_HISTORY_FILE))
    }

    /// Open or start a history file
    pub fn open_file(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            path: path.to_path_buf(),
            entries: store::read_json(path)?.unwrap_or_default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save a scan entry, replacing any entry with the same id
    pub fn save_scan(&mut self, entry: &ScanHistoryEntry) -> Result<(), StoreError> {
        self.entries.retain(|e| e.id.is_empty() || e.id != entry.id);
        self.entries.push(entry.clone());
        store::write_json(&self.path, &self.entries)
    }

    /// List scan history newest first, with pagination
    pub fn list_scans(&self, limit: usize, offset: usize) -> ScanHistoryResult {
        let mut entries: Vec<&ScanHistoryEntry> = self.entries.iter().collect();
        // Stable sort keeps later appends first among equal timestamps
        entries.reverse();
        entries.sort_by(|a, b| b.scan_time.cmp(&a.scan_time));

        ScanHistoryResult {
            entries: entries
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            total_count: self.entries.len(),
        }
    }

    /// Get a specific scan by ID
    pub fn get_scan(&self, id: &str) -> Option<&ScanHistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Generate a new unique ID
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::ScanStatus;
    use tempfile::TempDir;

    fn create_test_entry(scan_time: i64) -> ScanHistoryEntry {
        ScanHistoryEntry {
            id: HistoryRepository::generate_id(),
            album: "Family".to_string(),
            scan_time,
            sources: vec!["/test/path".to_string()],
            duration_ms: 1500,
            status: ScanStatus::Completed,
            ..Default::default()
        }
    }

    #[test]
    fn test_save_and_list() {
        let temp_dir = TempDir::new().unwrap();

        let mut repo = HistoryRepository::open(temp_dir.path()).unwrap();
        let entry = create_test_entry(100);
        repo.save_scan(&entry).unwrap();

        let reopened = HistoryRepository::open(temp_dir.path()).unwrap();
        let result = reopened.list_scans(10, 0);
        assert_eq!(result.total_count, 1);
        assert_eq!(result.entries[0].id, entry.id);
    }

    #[test]
    fn test_list_is_newest_first_and_paginated() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = HistoryRepository::open(temp_dir.path()).unwrap();
        for time in [10, 30, 20] {
            repo.save_scan(&create_test_entry(time)).unwrap();
        }

        let times: Vec<i64> = repo.list_scans(10, 0).entries.iter().map(|e| e.scan_time).collect();
        assert_eq!(times, vec![30, 20, 10]);

        let page = repo.list_scans(1, 1);
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].scan_time, 20);
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn test_get_scan() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = HistoryRepository::open(temp_dir.path()).unwrap();
        let entry = create_test_entry(1);
        repo.save_scan(&entry).unwrap();

        assert_eq!(repo.get_scan(&entry.id).unwrap().duration_ms, 1500);
        assert!(repo.get_scan("missing").is_none());
    }

    #[test]
    fn test_saving_same_id_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = HistoryRepository::open(temp_dir.path()).unwrap();
        let mut entry = create_test_entry(1);
        repo.save_scan(&entry).unwrap();
        entry.status = ScanStatus::Cancelled;
        repo.save_scan(&entry).unwrap();

        assert_eq!(repo.list_scans(10, 0).total_count, 1);
        assert_eq!(repo.get_scan(&entry.id).unwrap().status, ScanStatus::Cancelled);
    }
}
