//! Core library for quotaboard.
//!
//! Turns heterogeneous provider telemetry into canonical metric groups, cost
//! roll-ups and per-entity composition, then packs the result into a fixed-size
//! block of terminal text. Everything here is synchronous and free of I/O; the
//! binary crate owns polling, configuration files and the terminal.

pub mod aggregate;
pub mod classify;
pub mod dashboard;
pub mod format;
pub mod layout;
pub mod mix;
pub mod overrides;
pub mod paint;
pub mod snapshot;
pub mod status;
pub mod viewport;

pub use aggregate::{extract_cost_data, BudgetEntry, CostData, CostSort};
pub use classify::{classify, group_metrics, Classification, MetricGroup};
pub use dashboard::{Dashboard, DashboardView, RenderContext};
pub use layout::GridLayout;
pub use mix::{collect_mix, MixDimension, MixEntry};
pub use overrides::{OverrideRegistry, ProviderDisplay};
pub use paint::{Color, Paint, PlainPaint, Style};
pub use snapshot::{Metric, Snapshot, SnapshotSet, Status};
pub use viewport::Viewport;
