//! Types for the organize module.

use crate::core::quality::Resolution;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Folder structure options for the primary area
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FolderStructure {
    /// Year/Month (e.g., 2024/08/)
    #[default]
    YearMonth,
    /// Year/Month with the month name (e.g., 2024/08-August/)
    YearMonthNamed,
    /// Year/Month/Day (e.g., 2024/08/15/)
    YearMonthDay,
}

/// Operation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Copy files to destination (keep originals)
    #[default]
    Copy,
    /// Move files to destination
    Move,
}

/// Areas of an album root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    /// Date-organized first-class copies
    Primary,
    Duplicates,
    /// Junk and resolution-superseded images
    Junk,
    Review,
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Area::Primary => write!(f, "primary"),
            Area::Duplicates => write!(f, "duplicates"),
            Area::Junk => write!(f, "junk"),
            Area::Review => write!(f, "review"),
        }
    }
}

/// Why an item was sent to the review area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    /// The image header could not be decoded
    Unreadable,
    /// Readable but below the minimum size
    LowQuality(Resolution),
    /// The file could not be read for hashing
    HashFailure,
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewReason::Unreadable => write!(f, "unreadable image"),
            ReviewReason::LowQuality(resolution) => write!(f, "low quality ({resolution})"),
            ReviewReason::HashFailure => write!(f, "could not be hashed"),
        }
    }
}

/// Why an item was not copied anywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The source vanished before it could be processed
    NotFound,
    /// Same content was archived into this root by an earlier run
    AlreadyArchived,
    /// This source path was already placed by an earlier run
    AlreadyProcessed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "source not found"),
            SkipReason::AlreadyArchived => write!(f, "content already archived"),
            SkipReason::AlreadyProcessed => write!(f, "already processed by an earlier run"),
        }
    }
}

/// Where an item goes. Destination sub-paths are relative to the album root
/// and carry the desired file name; the final name is allocated at copy time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementDecision {
    Place {
        dest_subpath: PathBuf,
    },
    SupersedeDuplicate {
        dest_subpath: PathBuf,
        superseded_by: PathBuf,
    },
    Duplicate {
        dest_subpath: PathBuf,
        original: PathBuf,
    },
    Junk {
        dest_subpath: PathBuf,
    },
    Review {
        dest_subpath: PathBuf,
        reason: ReviewReason,
    },
    Skip {
        reason: SkipReason,
    },
}

impl PlacementDecision {
    /// Target area, `None` for skips
    pub fn area(&self) -> Option<Area> {
        match self {
            PlacementDecision::Place { .. } => Some(Area::Primary),
            PlacementDecision::Duplicate { .. } => Some(Area::Duplicates),
            PlacementDecision::SupersedeDuplicate { .. } | PlacementDecision::Junk { .. } => {
                Some(Area::Junk)
            }
            PlacementDecision::Review { .. } => Some(Area::Review),
            PlacementDecision::Skip { .. } => None,
        }
    }

    pub fn dest_subpath(&self) -> Option<&Path> {
        match self {
            PlacementDecision::Place { dest_subpath }
            | PlacementDecision::SupersedeDuplicate { dest_subpath, .. }
            | PlacementDecision::Duplicate { dest_subpath, .. }
            | PlacementDecision::Junk { dest_subpath }
            | PlacementDecision::Review { dest_subpath, .. } => Some(dest_subpath),
            PlacementDecision::Skip { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superseded_images_land_in_junk_area() {
        let decision = PlacementDecision::SupersedeDuplicate {
            dest_subpath: PathBuf::from("junk/IMG_1.jpg"),
            superseded_by: PathBuf::from("/a/IMG_1.png"),
        };
        assert_eq!(decision.area(), Some(Area::Junk));
        assert_eq!(decision.dest_subpath(), Some(Path::new("junk/IMG_1.jpg")));
    }

    #[test]
    fn skips_have_no_destination() {
        let decision = PlacementDecision::Skip {
            reason: SkipReason::NotFound,
        };
        assert_eq!(decision.area(), None);
        assert_eq!(decision.dest_subpath(), None);
    }

    #[test]
    fn config_enums_use_snake_case() {
        let json = serde_json::to_string(&FolderStructure::YearMonthNamed).unwrap();
        assert_eq!(json, "\"year_month_named\"");
        let mode: OperationMode = serde_json::from_str("\"move\"").unwrap();
        assert_eq!(mode, OperationMode::Move);
    }
}
