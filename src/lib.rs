//! # Media Organizer
//!
//! Builds a deduplicated, date-organized archive out of scattered photo and
//! video folders.
//!
//! ## Core Philosophy
//! - **Never touch the sources** - copy by default, log every placement
//! - **Never overwrite** - colliding names get a numeric suffix
//! - **Re-runnable** - a second run over the same sources copies nothing
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Classification, dedup, placement and the run pipeline
//! - `events` - Event-driven progress reporting
//! - `error` - Error types with paths and recovery hints

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` wins
/// over `verbose`, which only picks the default level.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = result {
        eprintln!("Tracing already initialized: {e}");
    }
}
