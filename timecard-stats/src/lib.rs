//! Timecard Stats
//!
//! This crate derives time tracking statistics from a snapshot of
//! recorded time blocks: per employee, per day, per ISO week and per team.
//! It exposes a tower::Service for InProcess calls from a presentation layer.

pub mod config;
pub mod directory;
pub mod filter;
pub mod format;
pub mod models;
pub mod rollup;
pub mod service;
pub mod snapshot;

pub use config::StatsConfig;
pub use directory::{Directory, LookupDiagnostics};
pub use filter::{filter_blocks, BlockFilter, Selection};
pub use format::format_minutes;
pub use models::{BlockStatus, Employee, LocationType, Team, TimeBlock};
pub use rollup::{
    aggregate, DayRollup, EmployeeRollup, Rollups, StatsSummary, TeamRollup, WeekRollup,
};
pub use service::{StatsReport, StatsRequest, StatsService};
pub use snapshot::{Snapshot, SnapshotError};
