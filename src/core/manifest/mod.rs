//! # Manifest Module
//!
//! The list of candidate media paths a run works through.
//!
//! ```json
//! { "images": ["/photos/IMG_1.jpg"], "videos": ["/photos/clip.mov"] }
//! ```
//!
//! Both keys are optional. Paths are not checked when the manifest is
//! loaded; a missing file is skipped when the run reaches it.

mod walker;

pub use walker::{DirectoryWalker, WalkConfig};

use crate::core::store;
use crate::error::{ManifestError, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Candidate media paths, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub images: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
}

impl Manifest {
    pub fn new(images: Vec<PathBuf>, videos: Vec<PathBuf>) -> Self {
        Self { images, videos }
    }

    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ManifestError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ManifestError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&raw).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a manifest, or an empty one when the file does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self, ManifestError> {
        match Self::load(path) {
            Err(ManifestError::NotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        store::write_json(path, self).map_err(|e| match e {
            StoreError::Write { path, reason } => ManifestError::Write { path, reason },
            other => ManifestError::Write {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }

    /// Union with another manifest. Both lists come out sorted and
    /// free of repeats.
    pub fn merge(&mut self, other: Manifest) {
        self.images = sorted_union(std::mem::take(&mut self.images), other.images);
        self.videos = sorted_union(std::mem::take(&mut self.videos), other.videos);
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }
}

fn sorted_union(a: Vec<PathBuf>, b: Vec<PathBuf>) -> Vec<PathBuf> {
    a.into_iter().chain(b).collect::<BTreeSet<_>>().into_iter().collect()
}
