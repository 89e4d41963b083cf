//! # Events Module
//!
//! Progress reporting for walks and runs.
//!
//! The core never prints. It emits [`Event`]s through an [`EventSender`]
//! and the CLI renders them.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Pipeline(PipelineEvent::Progress(p)) = event {
//!             println!("Placed {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&manifest, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
