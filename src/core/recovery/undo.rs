//! Reverting a run from its recovery log entries.

use super::RecoveryLog;
use crate::core::album::AlbumStore;
use crate::core::config::AlbumSpec;
use crate::core::digest::ContentDigest;
use crate::core::organize::{OperationMode, PlacementExecutor};
use crate::core::pipeline::RootLock;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// What an undo did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoReport {
    /// Copies deleted from the archive
    pub removed: usize,
    /// Moved files put back where they came from
    pub restored: usize,
    /// Entries whose archive file was already gone
    pub missing: usize,
    /// Album metadata entries dropped
    pub album_entries_dropped: usize,
    pub errors: Vec<String>,
}

/// Revert the files one run wrote under `base`.
///
/// Entries are processed newest first. Copies are deleted; moved files go
/// back to their original location when that location is free. Album
/// metadata entries for the reverted digests are dropped. The recovery log
/// itself is left as it is.
pub fn undo_run(base: &Path, run_id: &str) -> Result<UndoReport> {
    let log = RecoveryLog::open(base)?;
    let entries: Vec<_> = log.entries_for_run(run_id).cloned().collect();
    let mut report = UndoReport::default();

    if entries.is_empty() {
        tracing::info!("No recovery log entries for run {}", run_id);
        return Ok(report);
    }

    let mut reverted: BTreeMap<String, HashSet<ContentDigest>> = BTreeMap::new();
    let albums: HashSet<&str> = entries.iter().map(|e| e.album.as_str()).collect();
    let _locks = albums
        .iter()
        .map(|album| RootLock::acquire(&base.join(album)))
        .collect::<Result<Vec<_>>>()?;

    let mover = PlacementExecutor::new(OperationMode::Move);

    for entry in entries.iter().rev() {
        let destination = &entry.destination_path;
        if !destination.exists() {
            report.missing += 1;
            continue;
        }

        let outcome = if entry.operation == Some(OperationMode::Move) {
            if entry.original_path.exists() {
                Err(format!(
                    "{} is occupied, left {} in place",
                    entry.original_path.display(),
                    destination.display()
                ))
            } else {
                mover
                    .transfer(destination, &entry.original_path)
                    .map(|_| report.restored += 1)
                    .map_err(|e| e.to_string())
            }
        } else {
            fs::remove_file(destination)
                .map(|_| report.removed += 1)
                .map_err(|e| format!("Failed to remove {}: {}", destination.display(), e))
        };

        match outcome {
            Ok(()) => {
                if let Some(digest) = entry.digest {
                    reverted.entry(entry.album.clone()).or_default().insert(digest);
                }
            }
            Err(message) => {
                tracing::warn!("{}", message);
                report.errors.push(message);
            }
        }
    }

    for (album, digests) in reverted {
        let spec = AlbumSpec {
            name: album.clone(),
            tags: Vec::new(),
        };
        let mut store = AlbumStore::open(&base.join(&album), &spec)?;
        let dropped = store.remove_digests(&digests);
        if dropped > 0 {
            if let Err(e) = store.save() {
                tracing::warn!("{}", e);
                report.errors.push(e.to_string());
            }
        }
        report.album_entries_dropped += dropped;
    }

    tracing::info!(
        "Undo of run {}: {} removed, {} restored, {} missing",
        run_id,
        report.removed,
        report.restored,
        report.missing
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::album::PhotoRecord;
    use crate::core::organize::Area;
    use crate::core::recovery::RecoveryLogEntry;
    use tempfile::TempDir;

    fn logged(
        log: &mut RecoveryLog,
        original: &Path,
        destination: &Path,
        operation: OperationMode,
        digest: Option<ContentDigest>,
    ) {
        let mut entry = RecoveryLogEntry::now(original, destination, "Family");
        entry.run_id = Some("run-1".to_string());
        entry.area = Some(Area::Primary);
        entry.operation = Some(operation);
        entry.digest = digest;
        log.append(entry).unwrap();
    }

    #[test]
    fn copies_are_removed_and_album_entries_dropped() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        let root = base.join("Family");
        fs::create_dir_all(root.join("2024/08")).unwrap();
        let original = base.join("a.jpg");
        let copy = root.join("2024/08/a.jpg");
        fs::write(&original, b"a").unwrap();
        fs::write(&copy, b"a").unwrap();
        let digest = ContentDigest::of_bytes(b"a");

        let spec = AlbumSpec {
            name: "Family".to_string(),
            tags: vec![],
        };
        let mut store = AlbumStore::open(&root, &spec).unwrap();
        store.record(PhotoRecord {
            filename: "a.jpg".to_string(),
            digest,
            tags: vec![],
            flagged_for_review: false,
        });
        store.save().unwrap();

        let mut log = RecoveryLog::open(base).unwrap();
        logged(&mut log, &original, &copy, OperationMode::Copy, Some(digest));

        let report = undo_run(base, "run-1").unwrap();

        assert_eq!(report.removed, 1);
        assert_eq!(report.album_entries_dropped, 1);
        assert!(!copy.exists());
        assert!(original.exists());
        assert!(!AlbumStore::open(&root, &spec).unwrap().contains(&digest));
        // The log is kept
        assert_eq!(RecoveryLog::open(base).unwrap().entries().len(), 1);
    }

    #[test]
    fn moved_files_go_back() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        let moved = base.join("Family/2024/08/b.jpg");
        fs::create_dir_all(moved.parent().unwrap()).unwrap();
        fs::write(&moved, b"b").unwrap();
        let original = base.join("camera/b.jpg");

        let mut log = RecoveryLog::open(base).unwrap();
        logged(&mut log, &original, &moved, OperationMode::Move, None);

        let report = undo_run(base, "run-1").unwrap();

        assert_eq!(report.restored, 1);
        assert_eq!(fs::read(&original).unwrap(), b"b");
        assert!(!moved.exists());
    }

    #[test]
    fn occupied_original_is_reported_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        let moved = base.join("Family/c.jpg");
        fs::create_dir_all(moved.parent().unwrap()).unwrap();
        fs::write(&moved, b"archived").unwrap();
        let original = base.join("c.jpg");
        fs::write(&original, b"newer").unwrap();

        let mut log = RecoveryLog::open(base).unwrap();
        logged(&mut log, &original, &moved, OperationMode::Move, None);

        let report = undo_run(base, "run-1").unwrap();

        assert_eq!(report.errors.len(), 1);
        assert_eq!(fs::read(&original).unwrap(), b"newer");
        assert!(moved.exists());
    }

    #[test]
    fn unknown_run_does_nothing() {
        let temp = TempDir::new().unwrap();
        let report = undo_run(temp.path(), "nope").unwrap();
        assert_eq!(report, UndoReport::default());
    }
}
