//! # media-organize CLI
//!
//! Command-line interface for the media organizer.
//!
//! ## Usage
//! ```bash
//! media-organize organize manifest.json --dest ~/Archive --album Family
//! media-organize organize --walk ~/Camera --dest ~/Archive --album Family --tags "2024,trip"
//! media-organize undo --dest ~/Archive --run-id <id>
//! ```

mod cli;

use media_organizer::Result;

fn main() -> Result<()> {
    cli::run()
}
