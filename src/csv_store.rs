use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::MetricsError;
use crate::models::{Assignment, AttendanceRecord, Grade, Student};
use crate::rows::{AssignmentRow, AttendanceRow, GradeRow, StudentRow};
use crate::store::EntityStore;

pub const STUDENTS_FILE: &str = "students.csv";
pub const ASSIGNMENTS_FILE: &str = "assignments.csv";
pub const GRADES_FILE: &str = "grades.csv";
pub const ATTENDANCE_FILE: &str = "attendance.csv";

/// Four CSV files in one directory, one per collection, with a header row
/// naming the fields in snake_case.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parses one file on the blocking pool.
    async fn load<R, T, F>(&self, file: &str, validate: F) -> anyhow::Result<Vec<T>>
    where
        R: DeserializeOwned + 'static,
        T: Send + 'static,
        F: FnMut(R, usize) -> Result<T, MetricsError> + Send + 'static,
    {
        let path = self.dir.join(file);
        tokio::task::spawn_blocking(move || read_rows(&path, validate))
            .await
            .with_context(|| format!("csv reader for {file} did not finish"))?
    }
}

fn read_rows<R, T, F>(path: &Path, mut validate: F) -> anyhow::Result<Vec<T>>
where
    R: DeserializeOwned,
    F: FnMut(R, usize) -> Result<T, MetricsError>,
{
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<R>().enumerate() {
        let row = result.with_context(|| format!("malformed row in {}", path.display()))?;
        records.push(validate(row, index + 1)?);
    }
    tracing::debug!(file = %path.display(), rows = records.len(), "loaded csv");
    Ok(records)
}

#[async_trait]
impl EntityStore for CsvStore {
    async fn students(&self) -> anyhow::Result<Vec<Student>> {
        self.load(STUDENTS_FILE, StudentRow::into_record).await
    }

    async fn assignments(&self) -> anyhow::Result<Vec<Assignment>> {
        self.load(ASSIGNMENTS_FILE, AssignmentRow::into_record).await
    }

    async fn grades(&self) -> anyhow::Result<Vec<Grade>> {
        self.load(GRADES_FILE, GradeRow::into_record).await
    }

    async fn attendance(&self) -> anyhow::Result<Vec<AttendanceRecord>> {
        self.load(ATTENDANCE_FILE, AttendanceRow::into_record).await
    }
}
