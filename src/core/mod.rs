//! # Core Module
//!
//! The UI-agnostic organizer engine.
//!
//! ## Modules
//! - `manifest` - Candidate media lists and the directory walker that builds them
//! - `classify` - Junk, image, video or ignored, from the path alone
//! - `quality` - Image dimensions and the low-quality threshold
//! - `digest` - Content digests for exact-duplicate detection
//! - `dedup` - Same-name resolution and digest bookkeeping
//! - `organize` - Placement decisions, date buckets, collision-free names, copy/move
//! - `album` / `recovery` / `history` - JSON side files next to the archive
//! - `pipeline` - Orchestrates a run
//! - `export` - Copies organized trees into a clean upload folder

pub mod album;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod digest;
pub mod export;
pub mod history;
pub mod manifest;
pub mod organize;
pub mod pipeline;
pub mod quality;
pub mod recovery;
pub mod store;

// Re-export commonly used types
pub use classify::{Classification, Classifier, MediaItem, MediaKind};
pub use config::{AlbumSpec, OrganizerConfig};
pub use manifest::{DirectoryWalker, Manifest};
pub use pipeline::{OrganizerPipeline, RunSummary};
