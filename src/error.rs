//! Error types for the metrics engine.
//!
//! Aggregators downgrade [`MetricsError::ReferentialGap`] to "exclude and
//! continue"; the other variants propagate to the caller.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The four entity collections a snapshot is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Student,
    Assignment,
    Grade,
    Attendance,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordKind::Student => "student",
            RecordKind::Assignment => "assignment",
            RecordKind::Grade => "grade",
            RecordKind::Attendance => "attendance record",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricsError {
    /// A zero or negative denominator where a positive one is required.
    #[error("cannot compute a percentage against a total of {total}")]
    Division { total: f64 },

    /// A grade or attendance record points at a student or assignment that is
    /// not in the snapshot.
    #[error("{record} {record_id} references missing {target} {target_id}")]
    ReferentialGap {
        record: RecordKind,
        record_id: i64,
        target: RecordKind,
        target_id: i64,
    },

    /// A record that violates the store contract (missing field, bad label).
    #[error("{record} row {row}: {problem}")]
    InputShape {
        record: RecordKind,
        row: usize,
        problem: String,
    },
}

impl MetricsError {
    pub fn input_shape(record: RecordKind, row: usize, problem: impl Into<String>) -> Self {
        MetricsError::InputShape {
            record,
            row,
            problem: problem.into(),
        }
    }

    /// Returns `true` if aggregation may skip the offending record and go on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MetricsError::ReferentialGap { .. })
    }
}
