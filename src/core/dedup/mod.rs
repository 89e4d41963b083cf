//! # Dedup Module
//!
//! Two independent duplicate notions, applied in a fixed order:
//!
//! 1. **Same-name resolution** (images only, before hashing) - among images
//!    sharing a base file name, the largest pixel area is canonical and every
//!    other one is superseded, whatever its bytes are. Equal areas keep the
//!    first one discovered.
//! 2. **Exact content** (all media) - the first item with a digest is placed;
//!    later items with the same digest go to the duplicates area. Digests
//!    archived by earlier runs are skipped outright.

use crate::core::digest::ContentDigest;
use crate::core::quality::Resolution;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// One image taking part in same-name resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate {
    /// Position in discovery order
    pub index: usize,
    /// File name without extension
    pub base_name: String,
    pub resolution: Resolution,
}

/// A lower-resolution image displaced by its canonical namesake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supersession {
    pub superseded: usize,
    pub canonical: usize,
}

/// Result of same-name resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SameNameResolution {
    /// Discovery indices of canonical images, in discovery order
    pub canonical: Vec<usize>,
    /// Superseded images, in discovery order
    pub superseded: Vec<Supersession>,
}

impl SameNameResolution {
    /// The canonical image that displaced `index`, if it was displaced
    pub fn superseded_by(&self, index: usize) -> Option<usize> {
        self.superseded
            .iter()
            .find(|s| s.superseded == index)
            .map(|s| s.canonical)
    }
}

/// Pick the canonical image for every base name.
///
/// A later candidate replaces the current canonical only with a strictly
/// greater area, so ties are settled by discovery order.
pub fn resolve_same_name(candidates: &[NameCandidate]) -> SameNameResolution {
    let mut ordered: Vec<&NameCandidate> = candidates.iter().collect();
    ordered.sort_by_key(|c| c.index);

    let mut best: HashMap<&str, &NameCandidate> = HashMap::new();
    for &candidate in &ordered {
        let replace = best
            .get(candidate.base_name.as_str())
            .map_or(true, |current| candidate.resolution.area() > current.resolution.area());
        if replace {
            best.insert(candidate.base_name.as_str(), candidate);
        }
    }

    let mut resolution = SameNameResolution::default();
    for candidate in ordered {
        let winner = best[candidate.base_name.as_str()];
        if winner.index == candidate.index {
            resolution.canonical.push(candidate.index);
        } else {
            resolution.superseded.push(Supersession {
                superseded: candidate.index,
                canonical: winner.index,
            });
        }
    }
    resolution
}

/// What the digest set says about a digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestStatus {
    /// Not seen before; eligible for the primary area
    FirstSeen,
    /// Placed earlier in this run at the given destination
    DuplicateOf(PathBuf),
    /// Archived by an earlier run into the same destination root
    AlreadyArchived,
}

/// Digest set for one destination root
#[derive(Debug, Default)]
pub struct Deduplicator {
    placed: HashMap<ContentDigest, PathBuf>,
    archived: HashSet<ContentDigest>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the digests archived by earlier runs
    pub fn seeded<I>(archived: I) -> Self
    where
        I: IntoIterator<Item = ContentDigest>,
    {
        Self {
            placed: HashMap::new(),
            archived: archived.into_iter().collect(),
        }
    }

    pub fn check(&self, digest: &ContentDigest) -> DigestStatus {
        if let Some(destination) = self.placed.get(digest) {
            DigestStatus::DuplicateOf(destination.clone())
        } else if self.archived.contains(digest) {
            DigestStatus::AlreadyArchived
        } else {
            DigestStatus::FirstSeen
        }
    }

    /// Record where a digest was placed. The first placement wins.
    pub fn record(&mut self, digest: ContentDigest, destination: &Path) {
        self.placed
            .entry(digest)
            .or_insert_with(|| destination.to_path_buf());
    }
}
