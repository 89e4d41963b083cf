//! # Config Module
//!
//! The single immutable configuration value handed to the pipeline.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! {
//!   "min_width": 200,
//!   "batch": { "enabled": true, "default_album": "Family", "default_tags": ["scan"] },
//!   "date_range": { "start": "2024-08-01", "end": "2024-08-09" }
//! }
//! ```

use crate::core::history::SCAN_HISTORY_FILE;
use crate::core::organize::{FolderStructure, OperationMode};
use crate::core::recovery::RECOVERY_LOG_FILE;
use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// File name looked up under the user config directory when no config is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Inclusive date window applied to file modification time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Non-interactive album settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub enabled: bool,
    pub default_album: Option<String>,
    pub default_tags: Vec<String>,
}

/// Folder names of the secondary areas inside an album root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaNames {
    pub duplicates: String,
    pub junk: String,
    pub review: String,
}

impl Default for AreaNames {
    fn default() -> Self {
        Self {
            duplicates: "duplicates".to_string(),
            junk: "junk".to_string(),
            review: "review".to_string(),
        }
    }
}

impl AreaNames {
    pub fn all(&self) -> [&str; 3] {
        [&self.duplicates, &self.junk, &self.review]
    }
}

/// Organizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    /// Image extensions, without the leading dot
    pub image_extensions: Vec<String>,
    /// Video extensions, without the leading dot
    pub video_extensions: Vec<String>,
    /// Case-insensitive substrings that mark a path as junk
    pub junk_keywords: Vec<String>,
    /// File name suffixes of system, log and temp files
    pub junk_extensions: Vec<String>,
    /// Images narrower than this are low quality
    pub min_width: u32,
    /// Images shorter than this are low quality
    pub min_height: u32,
    /// Route low-quality (but readable) images to the review area instead of
    /// only flagging them in the album metadata
    pub review_low_quality: bool,
    pub batch: BatchSettings,
    pub date_range: Option<DateRange>,
    pub folder_structure: FolderStructure,
    pub operation: OperationMode,
    /// Skip content and paths already archived by earlier runs
    pub persist_digests: bool,
    pub areas: AreaNames,
    /// Folder name fragments skipped by directory walks
    pub skip_folders: Vec<String>,
    /// Whether directory walks include hidden files and folders
    pub include_hidden: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            image_extensions: strings(&[
                "jpg", "jpeg", "png", "gif", "bmp", "heic", "heif", "webp", "tif", "tiff",
            ]),
            video_extensions: strings(&[
                "mp4", "mov", "avi", "mkv", "wmv", "flv", "webm", "3gp", "mpeg", "m4v",
            ]),
            junk_keywords: strings(&[
                "thumbnail",
                "cache",
                "launch image",
                "launchimage",
                "launchscreen",
                "appicon",
                "placeholder",
                "previews",
                "assets.car",
                "xcode",
                ".framework",
                ".app/",
            ]),
            junk_extensions: strings(&[
                ".ds_store", ".tmp", ".log", ".ini", ".plist", ".db", ".thumbnails", ".lnk",
                ".exe", ".dll", ".sys", ".bak", ".swp", ".crdownload", ".part", ".icloud",
                ".trashinfo",
            ]),
            min_width: 100,
            min_height: 100,
            review_low_quality: true,
            batch: BatchSettings::default(),
            date_range: None,
            folder_structure: FolderStructure::default(),
            operation: OperationMode::default(),
            persist_digests: true,
            areas: AreaNames::default(),
            skip_folders: strings(&[
                "$Recycle.Bin",
                "System Volume Information",
                ".Trash",
                ".Spotlight-V100",
                ".fseventsd",
                ".DocumentRevisions-V100",
                "com.apple",
                "AppData",
                "Program Files",
                "ProgramData",
            ]),
            include_hidden: false,
        }
    }
}

impl OrganizerConfig {
    /// Load a config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `<user config dir>/media-organizer/config.json`, if the platform has one
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("media-organizer").join(DEFAULT_CONFIG_FILE))
    }

    /// Checks that do not depend on the destination
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(range) = self.date_range {
            if range.start > range.end {
                return Err(ConfigError::InvalidDateRange {
                    start: range.start.to_string(),
                    end: range.end.to_string(),
                });
            }
        }

        let names = self.areas.all();
        let distinct = names[0] != names[1] && names[1] != names[2] && names[0] != names[2];
        if !distinct || names.iter().any(|n| !is_single_component(n)) {
            return Err(ConfigError::InvalidAreaNames {
                names: names.iter().map(|n| n.to_string()).collect(),
            });
        }

        Ok(())
    }

    /// Resolve the album for a run: an explicit name wins, otherwise the
    /// batch default is used when batch mode is on.
    pub fn resolve_album(
        &self,
        explicit_name: Option<&str>,
        explicit_tags: &[String],
    ) -> Result<AlbumSpec, ConfigError> {
        let name = match explicit_name {
            Some(name) => name.trim().to_string(),
            None if self.batch.enabled => self
                .batch
                .default_album
                .as_deref()
                .map(|n| n.trim().to_string())
                .ok_or(ConfigError::MissingAlbum)?,
            None => return Err(ConfigError::MissingAlbum),
        };

        if !is_single_component(&name)
            || self.areas.all().contains(&name.as_str())
            || is_side_file_name(&name)
        {
            return Err(ConfigError::InvalidAlbumName { name });
        }

        let mut tags: Vec<String> = if explicit_tags.is_empty() && self.batch.enabled {
            self.batch.default_tags.clone()
        } else {
            explicit_tags.to_vec()
        };
        tags.retain(|t| !t.trim().is_empty());

        Ok(AlbumSpec { name, tags })
    }
}

/// The album a run writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSpec {
    pub name: String,
    pub tags: Vec<String>,
}

/// Names of the files kept next to the albums in the destination
fn is_side_file_name(name: &str) -> bool {
    [RECOVERY_LOG_FILE, SCAN_HISTORY_FILE]
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Split a comma separated tag list, dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
