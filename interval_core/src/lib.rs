#![forbid(unsafe_code)]

//! Core domain model and playback engine for the interval timer.
//!
//! This crate provides:
//! - Domain types (exercises, rests, repeated sets, plans)
//! - Flattening, totals and the playback timeline
//! - Intensity scoring
//! - Editing operations on the item tree
//! - The playback state machine and its audible cues
//! - Persistence (plan store, session history)

pub mod types;
pub mod error;
pub mod workout;
pub mod intensity;
pub mod timeline;
pub mod editor;
pub mod audio;
pub mod playback;
mod fileio;
pub mod store;
pub mod history;
pub mod catalog;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use workout::{calculate_total_time, count_intervals, flatten, generate_id};
pub use timeline::{build_timeline, Segment, TimelineStep};
pub use editor::MoveDirection;
pub use audio::{Cue, CuePlayer, SilentSink, TerminalBell, ToneSink};
pub use playback::{PlaybackSession, PlaybackSnapshot, PlaybackState, StepStatus};
pub use store::{JsonFileStore, MemoryStore, PlanStore, PlanSummary};
pub use history::{JsonlSink, SessionSummary, SummarySink};
pub use config::Config;
