//! # Pipeline Module
//!
//! Runs a manifest into an album.
//!
//! ## Pipeline Phases
//! 1. **Discovering** - Stat every entry, apply the date filter, classify and
//!    read image headers
//! 2. **Resolving** - Pick the highest-resolution image among namesakes
//! 3. **Placing** - Hash, deduplicate, bucket by date and copy, logging every
//!    placement to the recovery log and the album metadata
//!
//! Items are placed one at a time in manifest order, so destination names and
//! "first seen" are deterministic. Only one run may write to an album root at
//! a time (see [`RootLock`]).

mod executor;
mod lock;
mod types;

pub use executor::{OrganizerPipeline, PipelineBuilder, RunHandle};
pub use lock::{RootLock, LOCK_FILE};
pub use types::*;
