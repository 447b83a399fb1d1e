//! The data-access boundary: anything that can hand over the four entity
//! collections.

use async_trait::async_trait;

use crate::models::{Assignment, AttendanceRecord, Grade, Student};
use crate::snapshot::Snapshot;

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn students(&self) -> anyhow::Result<Vec<Student>>;
    async fn assignments(&self) -> anyhow::Result<Vec<Assignment>>;
    async fn grades(&self) -> anyhow::Result<Vec<Grade>>;
    async fn attendance(&self) -> anyhow::Result<Vec<AttendanceRecord>>;
}

/// Fetches all four collections concurrently. If any fetch fails the whole
/// load fails; there is no partial snapshot.
pub async fn load_snapshot(store: &dyn EntityStore) -> anyhow::Result<Snapshot> {
    let (students, assignments, grades, attendance) = tokio::try_join!(
        store.students(),
        store.assignments(),
        store.grades(),
        store.attendance(),
    )?;
    Ok(Snapshot::new(students, assignments, grades, attendance)?)
}

/// Collections held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub students: Vec<Student>,
    pub assignments: Vec<Assignment>,
    pub grades: Vec<Grade>,
    pub attendance: Vec<AttendanceRecord>,
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn students(&self) -> anyhow::Result<Vec<Student>> {
        Ok(self.students.clone())
    }

    async fn assignments(&self) -> anyhow::Result<Vec<Assignment>> {
        Ok(self.assignments.clone())
    }

    async fn grades(&self) -> anyhow::Result<Vec<Grade>> {
        Ok(self.grades.clone())
    }

    async fn attendance(&self) -> anyhow::Result<Vec<AttendanceRecord>> {
        Ok(self.attendance.clone())
    }
}
