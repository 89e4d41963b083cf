//! # Album Module
//!
//! Per-album metadata document at `<album root>/<Album>.json`.
//!
//! The document accumulates across runs that reuse the album. Photos are
//! keyed by digest: a digest is listed at most once.

use crate::core::config::AlbumSpec;
use crate::core::digest::ContentDigest;
use crate::core::store;
use crate::error::StoreError;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// One photo recorded in an album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub filename: String,
    #[serde(rename = "hash")]
    pub digest: ContentDigest,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "review", default)]
    pub flagged_for_review: bool,
}

/// Album metadata document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumMetadata {
    #[serde(rename = "album", default)]
    pub album_name: String,
    #[serde(rename = "created")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub photos: Vec<PhotoRecord>,
}

impl AlbumMetadata {
    pub fn new(album_name: &str) -> Self {
        Self {
            album_name: album_name.to_string(),
            created_at: Local::now().naive_local(),
            tags: BTreeSet::new(),
            photos: Vec::new(),
        }
    }
}

/// Loaded album metadata plus its location
#[derive(Debug)]
pub struct AlbumStore {
    path: PathBuf,
    metadata: AlbumMetadata,
    digests: HashSet<ContentDigest>,
}

impl AlbumStore {
    /// `<album root>/<Album>.json`
    pub fn metadata_path(album_root: &Path, album_name: &str) -> PathBuf {
        album_root.join(format!("{album_name}.json"))
    }

    /// Open the album's document, starting a new one if none exists.
    /// The album's tags are added to the document's tag set.
    pub fn open(album_root: &Path, album: &AlbumSpec) -> Result<Self, StoreError> {
        let path = Self::metadata_path(album_root, &album.name);
        let mut metadata: AlbumMetadata =
            store::read_json(&path)?.unwrap_or_else(|| AlbumMetadata::new(&album.name));
        if metadata.album_name.is_empty() {
            metadata.album_name = album.name.clone();
        }
        metadata.tags.extend(album.tags.iter().cloned());

        let digests = metadata.photos.iter().map(|p| p.digest).collect();
        Ok(Self {
            path,
            metadata,
            digests,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &AlbumMetadata {
        &self.metadata
    }

    /// Digests listed in the album
    pub fn digests(&self) -> impl Iterator<Item = ContentDigest> + '_ {
        self.metadata.photos.iter().map(|p| p.digest)
    }

    pub fn contains(&self, digest: &ContentDigest) -> bool {
        self.digests.contains(digest)
    }

    /// Add a photo. Returns false when its digest is already listed.
    pub fn record(&mut self, photo: PhotoRecord) -> bool {
        if !self.digests.insert(photo.digest) {
            return false;
        }
        self.metadata.photos.push(photo);
        true
    }

    /// Drop photos with any of the given digests, returning how many went
    pub fn remove_digests(&mut self, digests: &HashSet<ContentDigest>) -> usize {
        let before = self.metadata.photos.len();
        self.metadata.photos.retain(|p| !digests.contains(&p.digest));
        self.digests.retain(|d| !digests.contains(d));
        before - self.metadata.photos.len()
    }

    pub fn save(&self) -> Result<(), StoreError> {
        store::write_json(&self.path, &self.metadata)
    }
}
