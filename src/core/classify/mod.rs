//! # Classify Module
//!
//! Decides what a discovered path is before anything reads it.
//!
//! Classification is a pure function of the path:
//! 1. **Junk** - a junk keyword appears anywhere in the lowercased path, or the
//!    file name ends with a system/log/temp extension
//! 2. **Image** / **Video** - the extension is on an allow-list
//! 3. **Ignored** - anything else (not copied, not an error)

use crate::core::config::OrganizerConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Kind of supported media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// Result of classifying a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Junk,
    Image,
    Video,
    Ignored,
}

impl Classification {
    pub fn media_kind(self) -> Option<MediaKind> {
        match self {
            Classification::Image => Some(MediaKind::Image),
            Classification::Video => Some(MediaKind::Video),
            Classification::Junk | Classification::Ignored => None,
        }
    }
}

/// A media file as listed by a manifest or a directory walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub source_path: PathBuf,
    pub kind: MediaKind,
    /// Lowercased, without the leading dot
    pub extension: String,
}

impl MediaItem {
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// File name without its extension; the key for same-name resolution
    pub fn base_name(&self) -> String {
        self.source_path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Classifies paths into junk, supported media, or ignored
#[derive(Debug, Clone)]
pub struct Classifier {
    image_extensions: HashSet<String>,
    video_extensions: HashSet<String>,
    junk_keywords: Vec<String>,
    junk_extensions: Vec<String>,
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

impl Classifier {
    /// Build a classifier from the extension and keyword lists of a config
    pub fn from_config(config: &OrganizerConfig) -> Self {
        Self {
            image_extensions: config
                .image_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .collect(),
            video_extensions: config
                .video_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .collect(),
            junk_keywords: config
                .junk_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            junk_extensions: config
                .junk_extensions
                .iter()
                .map(|e| format!(".{}", normalize_extension(e)))
                .filter(|e| e.len() > 1)
                .collect(),
        }
    }

    /// Classify a path
    pub fn classify(&self, path: &Path) -> Classification {
        if self.is_junk(path) {
            return Classification::Junk;
        }

        match self.kind_by_extension(path) {
            Some(MediaKind::Image) => Classification::Image,
            Some(MediaKind::Video) => Classification::Video,
            None => Classification::Ignored,
        }
    }

    /// Media kind from the extension alone, ignoring junk rules
    pub fn kind_by_extension(&self, path: &Path) -> Option<MediaKind> {
        let ext = extension_of(path)?;
        if self.image_extensions.contains(&ext) {
            Some(MediaKind::Image)
        } else if self.video_extensions.contains(&ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Junk keyword or junk extension match
    pub fn is_junk(&self, path: &Path) -> bool {
        let lower_path = path.to_string_lossy().to_lowercase();
        self.junk_keywords.iter().any(|k| lower_path.contains(k.as_str()))
            || self.has_junk_extension(path)
    }

    /// File name ends with a system, log or temp suffix
    pub fn has_junk_extension(&self, path: &Path) -> bool {
        let lower_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.junk_extensions
            .iter()
            .any(|e| lower_name.ends_with(e.as_str()))
    }

    /// Whether the extension is on either media allow-list
    pub fn is_supported(&self, path: &Path) -> bool {
        self.kind_by_extension(path).is_some()
    }

    /// Turn a path into a [`MediaItem`] when it is supported, non-junk media
    pub fn media_item(&self, path: &Path) -> Option<MediaItem> {
        let kind = self.classify(path).media_kind()?;
        Some(MediaItem {
            source_path: path.to_path_buf(),
            kind,
            extension: extension_of(path).unwrap_or_default(),
        })
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
