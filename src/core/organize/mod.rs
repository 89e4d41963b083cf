//! Placement into the archive.
//!
//! Buckets items by date, allocates collision-free destination names and
//! performs the copy or move.

mod allocator;
mod bucket;
mod executor;
mod types;

pub use allocator::{ensure_dir, PathAllocator};
pub use bucket::{DateBucket, DateBucketer};
pub use executor::PlacementExecutor;
pub use types::*;
