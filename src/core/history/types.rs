//! Types for scan history storage.

use crate::core::pipeline::RunCounts;
use serde::{Deserialize, Serialize};

/// Status of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    #[default]
    Completed,
    Cancelled,
}

impl ScanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A scan history entry, one per run.
///
/// Every field is defaulted so entries written by older tools still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanHistoryEntry {
    /// Run id, matching the recovery log
    pub id: String,
    pub album: String,
    /// Unix timestamp in seconds
    pub scan_time: i64,
    /// Manifest files or walked directories the run was fed from
    pub sources: Vec<String>,
    pub counts: RunCounts,
    pub duration_ms: u64,
    pub status: ScanStatus,
}

/// Result of listing scan history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanHistoryResult {
    pub entries: Vec<ScanHistoryEntry>,
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_status_names() {
        assert_eq!(ScanStatus::Completed.as_str(), "completed");
        assert_eq!(ScanStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_legacy_entries_load() {
        let legacy = r#"{"scan_path": "/photos", "num_images": 3, "time_seconds": 1.5}"#;
        let entry: ScanHistoryEntry = serde_json::from_str(legacy).unwrap();
        assert!(entry.id.is_empty());
        assert_eq!(entry.status, ScanStatus::Completed);
    }
}
