//! Event type definitions for progress reporting.

use crate::core::organize::{Area, SkipReason};
use crate::core::pipeline::RunSummary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory walk events
    Walk(WalkEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
    /// Per-item outcomes
    Item(ItemEvent),
}

/// Events while walking source directories into a manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalkEvent {
    /// Walking has started
    Started { roots: Vec<PathBuf> },
    /// Progress update while walking
    Progress(WalkProgress),
    /// A system folder was pruned
    FolderSkipped { path: PathBuf },
    /// An error occurred but walking continues
    Error { path: PathBuf, message: String },
    /// Walking completed
    Completed { images: usize, videos: usize },
}

/// Progress information while walking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkProgress {
    /// Number of directories entered so far
    pub directories_walked: usize,
    /// Number of media files found so far
    pub media_found: usize,
    /// Directory being walked
    pub current_path: PathBuf,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// A run has started
    Started { run_id: String, total_items: usize },
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Progress update while placing items
    Progress(PlacementProgress),
    /// Run finished normally
    Completed { summary: RunSummary },
    /// Run stopped between items
    Cancelled { summary: RunSummary },
    /// Run could not start
    Error { message: String },
}

/// Phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    /// Metadata, date filter, classification, quality
    Discovering,
    /// Same-name resolution between images
    Resolving,
    /// Hashing, dedup, copy
    Placing,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Discovering => write!(f, "Discovering"),
            PipelinePhase::Resolving => write!(f, "Resolving"),
            PipelinePhase::Placing => write!(f, "Placing"),
        }
    }
}

/// Progress information while placing items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementProgress {
    /// Items handled so far in the placing phase
    pub completed: usize,
    /// Items that reach the placing phase
    pub total: usize,
    /// Item being placed
    pub current_path: PathBuf,
}

/// Outcome of a single item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ItemEvent {
    /// Copied or moved into an area of the album root
    Routed {
        source: PathBuf,
        destination: PathBuf,
        area: Area,
    },
    /// Nothing was copied
    Skipped { source: PathBuf, reason: SkipReason },
    /// The item failed and the run continued
    Failed { source: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Walk(WalkEvent::Progress(WalkProgress {
            directories_walked: 10,
            media_found: 50,
            current_path: PathBuf::from("/photos"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Walk(WalkEvent::Progress(p)) => {
                assert_eq!(p.media_found, 50);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn item_events_carry_area() {
        let event = Event::Item(ItemEvent::Routed {
            source: PathBuf::from("/src/IMG_1.jpg"),
            destination: PathBuf::from("/archive/Family/junk/IMG_1.jpg"),
            area: Area::Junk,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"junk\""));
    }
}
