//! Derived metrics for one classroom: percentages, grade bands, the
//! gradebook matrix, per-student and per-assignment reports, and the
//! dashboard summary.
//!
//! Every aggregate is a pure function of four collections (students,
//! assignments, grades, attendance). [`store::load_snapshot`] fetches them
//! from an [`store::EntityStore`] as one [`snapshot::Snapshot`].

pub mod attendance;
pub mod band;
pub mod config;
pub mod csv_store;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod gradebook;
pub mod lookup;
pub mod metrics;
pub mod models;
pub mod render;
pub mod report;
pub mod rows;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use band::{classify, GradeBand};
pub use dashboard::dashboard_summary;
pub use error::MetricsError;
pub use gradebook::{build_gradebook_matrix, Cell, GradebookMatrix};
pub use metrics::{average, percentage, rate};
pub use report::{assignment_stats, grade_distribution, student_reports, GradeDistribution};
pub use snapshot::Snapshot;
