//! # Scan History Module
//!
//! One summary per run in `<base>/scan_history.json`, for browsing past
//! runs and finding run ids to undo.

mod repository;
mod types;

pub use repository::{HistoryRepository, SCAN_HISTORY_FILE};
pub use types::{ScanHistoryEntry, ScanHistoryResult, ScanStatus};
