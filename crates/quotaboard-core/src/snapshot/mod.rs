//! Snapshot model: the record each provider poll hands to the core.

mod load;
mod types;

pub use load::{parse_snapshots, SnapshotError};
pub use types::{Metric, Snapshot, SnapshotSet, Status, TimePoint};
