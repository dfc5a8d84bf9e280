//! Snapshot sources feeding the dashboard.
//!
//! A source runs as a tokio task and publishes complete snapshot sets over
//! an mpsc channel. The UI loop stores the newest set and renders it.

mod demo;
mod file;

pub use demo::{demo_snapshots, DemoSource};
pub use file::{read_snapshots, FileSource};

use quotaboard_core::SnapshotSet;

/// Message sent from a source to the main loop
#[derive(Debug)]
pub enum SourceMessage {
    /// A complete replacement set
    SnapshotsUpdated(SnapshotSet),
    /// Error while refreshing; the previous set stays current
    Error(String),
}
