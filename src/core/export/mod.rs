//! # Export Module
//!
//! Copies organized album trees into a clean folder for sharing or upload.
//!
//! Relative structure is preserved. Flagged folders (the duplicates, junk
//! and review areas) are left out unless asked for, only supported media is
//! copied and nothing already in the target is overwritten.

use crate::core::classify::Classifier;
use crate::core::config::OrganizerConfig;
use crate::core::organize::{OperationMode, PlacementExecutor};
use crate::error::{OrganizerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What an export did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    pub copied: usize,
    /// Files left alone because the target already had them
    pub skipped_existing: usize,
    /// Flagged folders not descended into
    pub skipped_folders: usize,
    pub errors: Vec<String>,
}

/// Copies organized trees into an export folder
pub struct CleanExporter {
    flagged: HashSet<String>,
    classifier: Classifier,
    include_flagged: bool,
}

impl CleanExporter {
    pub fn from_config(config: &OrganizerConfig) -> Self {
        Self {
            flagged: config.areas.all().iter().map(|n| n.to_lowercase()).collect(),
            classifier: Classifier::from_config(config),
            include_flagged: false,
        }
    }

    /// Also copy the flagged folders
    pub fn include_flagged(mut self, include: bool) -> Self {
        self.include_flagged = include;
        self
    }

    /// Copy every source tree into `target`. Missing sources are reported
    /// and skipped.
    pub fn export(&self, sources: &[PathBuf], target: &Path) -> Result<ExportReport> {
        fs::create_dir_all(target).map_err(|source| OrganizerError::Io {
            path: target.to_path_buf(),
            source,
        })?;

        let copier = PlacementExecutor::new(OperationMode::Copy);
        let mut report = ExportReport::default();

        for source in sources {
            if !source.is_dir() {
                let message = format!("Source folder not found: {}", source.display());
                tracing::warn!("{}", message);
                report.errors.push(message);
                continue;
            }

            tracing::info!("Exporting from {}", source.display());
            let mut skipped_folders = 0usize;
            let walker = WalkDir::new(source)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    if entry.depth() == 0 || !entry.file_type().is_dir() {
                        return true;
                    }
                    if entry.path().starts_with(target) {
                        return false;
                    }
                    if !self.include_flagged && self.is_flagged(entry.path()) {
                        tracing::debug!("Skipping flagged folder {}", entry.path().display());
                        skipped_folders += 1;
                        return false;
                    }
                    true
                });

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        report.errors.push(e.to_string());
                        continue;
                    }
                };
                let path = entry.path();
                if !entry.file_type().is_file() || !self.classifier.is_supported(path) {
                    continue;
                }

                let Ok(relative) = path.strip_prefix(source) else {
                    continue;
                };
                let destination = target.join(relative);
                if destination.exists() {
                    tracing::debug!("Already in export: {}", destination.display());
                    report.skipped_existing += 1;
                    continue;
                }

                match copier.transfer(path, &destination) {
                    Ok(_) => report.copied += 1,
                    Err(e) => {
                        tracing::warn!("{}", e);
                        report.errors.push(e.to_string());
                    }
                }
            }
            report.skipped_folders += skipped_folders;
        }

        tracing::info!(
            "Export copied {} files, {} already present, {} folders skipped",
            report.copied,
            report.skipped_existing,
            report.skipped_folders
        );
        Ok(report)
    }

    fn is_flagged(&self, dir: &Path) -> bool {
        dir.file_name()
            .map(|n| self.flagged.contains(&n.to_string_lossy().to_lowercase()))
            .unwrap_or(false)
    }
}
