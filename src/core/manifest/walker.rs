//! Directory walking into a manifest, using walkdir.

use super::Manifest;
use crate::core::classify::{Classifier, MediaKind};
use crate::core::config::OrganizerConfig;
use crate::error::ManifestError;
use crate::events::{Event, EventSender, WalkEvent, WalkProgress};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// What a directory walk skips
#[derive(Debug, Clone, Default)]
pub struct WalkConfig {
    /// Case-insensitive path fragments of folders to prune
    pub skip_folders: Vec<String>,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// A tree never to descend into, usually the destination root
    pub exclude: Option<PathBuf>,
}

impl WalkConfig {
    pub fn from_config(config: &OrganizerConfig) -> Self {
        Self {
            skip_folders: config
                .skip_folders
                .iter()
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            include_hidden: config.include_hidden,
            follow_symlinks: false,
            exclude: None,
        }
    }

    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude = Some(path.into());
        self
    }
}

/// Produces manifests from source directories.
///
/// Files whose extension is on a media allow-list are listed; files with a
/// junk extension are dropped. Junk keywords are left to the pipeline so
/// those files still reach the junk area.
pub struct DirectoryWalker {
    config: WalkConfig,
    classifier: Classifier,
}

impl DirectoryWalker {
    pub fn new(config: WalkConfig, classifier: Classifier) -> Self {
        Self { config, classifier }
    }

    pub fn from_config(config: &OrganizerConfig) -> Self {
        Self::new(WalkConfig::from_config(config), Classifier::from_config(config))
    }

    pub fn walk(&self, roots: &[PathBuf]) -> Result<Manifest, ManifestError> {
        self.walk_with_events(roots, &crate::events::null_sender())
    }

    pub fn walk_with_events(
        &self,
        roots: &[PathBuf],
        events: &EventSender,
    ) -> Result<Manifest, ManifestError> {
        for root in roots {
            if !root.is_dir() {
                return Err(ManifestError::DirectoryNotFound { path: root.clone() });
            }
        }

        events.send(Event::Walk(WalkEvent::Started {
            roots: roots.to_vec(),
        }));

        let mut manifest = Manifest::default();
        let mut directories_walked = 0usize;

        for root in roots {
            let walker = WalkDir::new(root)
                .follow_links(self.config.follow_symlinks)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| self.should_descend(entry, root, events));

            for entry_result in walker {
                let entry = match entry_result {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                        tracing::warn!("Failed to read {}: {}", path.display(), e);
                        events.send(Event::Walk(WalkEvent::Error {
                            path,
                            message: e.to_string(),
                        }));
                        continue;
                    }
                };

                let path = entry.path();
                if entry.file_type().is_dir() {
                    directories_walked += 1;
                    events.send(Event::Walk(WalkEvent::Progress(WalkProgress {
                        directories_walked,
                        media_found: manifest.len(),
                        current_path: path.to_path_buf(),
                    })));
                    continue;
                }

                if self.classifier.has_junk_extension(path) {
                    continue;
                }

                match self.classifier.kind_by_extension(path) {
                    Some(MediaKind::Image) => manifest.images.push(path.to_path_buf()),
                    Some(MediaKind::Video) => manifest.videos.push(path.to_path_buf()),
                    None => {}
                }
            }
        }

        tracing::info!(
            "Walk found {} images and {} videos in {} directories",
            manifest.images.len(),
            manifest.videos.len(),
            directories_walked
        );
        events.send(Event::Walk(WalkEvent::Completed {
            images: manifest.images.len(),
            videos: manifest.videos.len(),
        }));

        Ok(manifest)
    }

    fn should_descend(&self, entry: &DirEntry, root: &Path, events: &EventSender) -> bool {
        // Roots are always walked
        if entry.depth() == 0 {
            return true;
        }

        let path = entry.path();
        if !self.config.include_hidden && is_hidden(path) {
            return false;
        }

        if !entry.file_type().is_dir() {
            return true;
        }

        if let Some(exclude) = &self.config.exclude {
            if path.starts_with(exclude) {
                return false;
            }
        }

        // Only the part below the root is matched against folder fragments
        let relative = path.strip_prefix(root).unwrap_or(path);
        let lower = relative.to_string_lossy().to_lowercase();
        if self.config.skip_folders.iter().any(|s| lower.contains(s.as_str())) {
            tracing::debug!("Skipping folder {}", path.display());
            events.send(Event::Walk(WalkEvent::FolderSkipped {
                path: path.to_path_buf(),
            }));
            return false;
        }

        true
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
