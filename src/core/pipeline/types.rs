//! Run results and cancellation.

use crate::core::history::ScanStatus;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-outcome item counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunCounts {
    /// Manifest entries looked at
    pub processed: usize,
    /// Placed into the date-organized primary area
    pub copied: usize,
    /// Placed into the duplicates area
    pub duplicates: usize,
    /// Lower-resolution namesakes placed into the junk area
    pub superseded: usize,
    /// Junk placed into the junk area
    pub junk: usize,
    /// Placed into the review area
    pub reviewed: usize,
    /// Missing, already archived or already processed
    pub skipped: usize,
    /// Outside the configured date range
    pub filtered: usize,
    /// Not a supported media type
    pub ignored: usize,
    /// Copy or move failed
    pub failed: usize,
    /// Side-file writes that failed during the run
    pub store_failures: usize,
}

/// A lower-resolution image displaced by its namesake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupersededItem {
    pub source: PathBuf,
    pub canonical: PathBuf,
    pub destination: PathBuf,
}

/// An exact copy of content already placed in this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateItem {
    pub source: PathBuf,
    /// Where the first copy of this content was placed
    pub original: PathBuf,
    pub destination: PathBuf,
}

/// Result of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub album: String,
    pub album_root: PathBuf,
    pub counts: RunCounts,
    pub duration_ms: u64,
    pub status: ScanStatus,
    /// Superseded images, in discovery order
    pub superseded: Vec<SupersededItem>,
    /// Exact duplicates, in discovery order
    pub duplicates: Vec<DuplicateItem>,
    /// Per-item error messages
    pub errors: Vec<String>,
}

impl RunSummary {
    pub fn is_cancelled(&self) -> bool {
        self.status == ScanStatus::Cancelled
    }
}

/// Cooperative cancellation flag shared with a running pipeline.
///
/// Checked between items; a copy in progress always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn counts_serialize_by_name() {
        let counts = RunCounts {
            copied: 2,
            ..Default::default()
        };
        let json = serde_json::to_string(&counts).unwrap();
        assert!(json.contains("\"copied\":2"));
    }
}
