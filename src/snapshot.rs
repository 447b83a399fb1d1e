//! One consistent set of the four entity collections.
//!
//! Every view computed from a [`Snapshot`] sees the same data, so a caller
//! holding a snapshot can never mix figures from two different loads.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::attendance::{self, DaySummary};
use crate::dashboard::dashboard_summary;
use crate::error::{MetricsError, RecordKind};
use crate::gradebook::GradebookMatrix;
use crate::lookup::{referential_gaps, References};
use crate::models::{
    Assignment, AssignmentStat, AttendanceRecord, DashboardStats, Grade, Student, StudentReport,
};
use crate::report::{self, GradeDistribution};

#[derive(Debug, Clone)]
pub struct Snapshot {
    id: Uuid,
    captured_at: DateTime<Utc>,
    students: Vec<Student>,
    assignments: Vec<Assignment>,
    grades: Vec<Grade>,
    attendance: Vec<AttendanceRecord>,
}

impl Snapshot {
    /// Checks id uniqueness within each collection and that every
    /// assignment has a positive point total.
    pub fn new(
        students: Vec<Student>,
        assignments: Vec<Assignment>,
        grades: Vec<Grade>,
        attendance: Vec<AttendanceRecord>,
    ) -> Result<Self, MetricsError> {
        ensure_unique_ids(RecordKind::Student, students.iter().map(|s| s.id))?;
        ensure_unique_ids(RecordKind::Assignment, assignments.iter().map(|a| a.id))?;
        ensure_unique_ids(RecordKind::Grade, grades.iter().map(|g| g.id))?;
        ensure_unique_ids(RecordKind::Attendance, attendance.iter().map(|r| r.id))?;

        if let Some((row, assignment)) = assignments
            .iter()
            .enumerate()
            .find(|(_, a)| !(a.total_points > 0.0))
        {
            return Err(MetricsError::input_shape(
                RecordKind::Assignment,
                row + 1,
                format!(
                    "assignment {} has non-positive total points {}",
                    assignment.id, assignment.total_points
                ),
            ));
        }

        let snapshot = Self {
            id: Uuid::new_v4(),
            captured_at: Utc::now(),
            students,
            assignments,
            grades,
            attendance,
        };
        tracing::info!(
            snapshot_id = %snapshot.id,
            students = snapshot.students.len(),
            assignments = snapshot.assignments.len(),
            grades = snapshot.grades.len(),
            attendance = snapshot.attendance.len(),
            "snapshot captured"
        );
        Ok(snapshot)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    pub fn attendance(&self) -> &[AttendanceRecord] {
        &self.attendance
    }

    pub fn gradebook(&self) -> Result<GradebookMatrix<'_>, MetricsError> {
        GradebookMatrix::build(&self.students, &self.assignments, &self.grades)
    }

    pub fn student_reports(&self) -> Result<Vec<StudentReport>, MetricsError> {
        Ok(report::student_reports_from(&self.gradebook()?, &self.attendance))
    }

    pub fn grade_distribution(&self) -> Result<GradeDistribution, MetricsError> {
        Ok(report::grade_distribution(&self.student_reports()?))
    }

    pub fn assignment_stats(&self) -> Result<Vec<AssignmentStat>, MetricsError> {
        Ok(report::assignment_stats_from(&self.gradebook()?))
    }

    pub fn dashboard(&self) -> Result<DashboardStats, MetricsError> {
        dashboard_summary(
            &self.students,
            &self.assignments,
            &self.grades,
            &self.attendance,
        )
    }

    /// Per-day attendance for students in the roster, oldest first.
    pub fn attendance_calendar(&self) -> Vec<DaySummary> {
        let refs = References::new(&self.students, &self.assignments);
        attendance::calendar(&attendance::attributable(&refs, &self.attendance))
    }

    pub fn attendance_on(&self, date: NaiveDate) -> DaySummary {
        let refs = References::new(&self.students, &self.assignments);
        attendance::day_summary(&attendance::attributable(&refs, &self.attendance), date)
    }

    pub fn referential_gaps(&self) -> Vec<MetricsError> {
        referential_gaps(
            &self.students,
            &self.assignments,
            &self.grades,
            &self.attendance,
        )
    }

    /// Every view at once, all from this snapshot.
    pub fn class_report(&self) -> Result<ClassReport, MetricsError> {
        let matrix = self.gradebook()?;
        let students = report::student_reports_from(&matrix, &self.attendance);
        let distribution = report::grade_distribution(&students);
        let assignments = report::assignment_stats_from(&matrix);

        Ok(ClassReport {
            snapshot_id: self.id,
            captured_at: self.captured_at,
            dashboard: self.dashboard()?,
            students,
            assignments,
            distribution,
            attendance: self.attendance_calendar(),
            excluded: self.referential_gaps(),
        })
    }
}

fn ensure_unique_ids<I>(record: RecordKind, ids: I) -> Result<(), MetricsError>
where
    I: IntoIterator<Item = i64>,
{
    let mut seen = HashSet::new();
    for (row, id) in ids.into_iter().enumerate() {
        if !seen.insert(id) {
            return Err(MetricsError::input_shape(
                record,
                row + 1,
                format!("duplicate id {id}"),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassReport {
    pub snapshot_id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub dashboard: DashboardStats,
    pub students: Vec<StudentReport>,
    pub assignments: Vec<AssignmentStat>,
    pub distribution: GradeDistribution,
    pub attendance: Vec<DaySummary>,
    pub excluded: Vec<MetricsError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{assignment, attendance, grade, student};
    use crate::models::AttendanceStatus::{Absent, Present};

    fn sample() -> Snapshot {
        Snapshot::new(
            vec![student(1, "Ada", "Park"), student(2, "Ben", "Okafor")],
            vec![assignment(10, "Quiz 1", 20.0), assignment(11, "Essay", 50.0)],
            vec![
                grade(1, 1, 10, 18.0, 3),
                grade(2, 2, 10, 12.0, 4),
                grade(3, 2, 11, 40.0, 6),
                grade(4, 5, 11, 40.0, 7),
            ],
            vec![
                attendance(1, 1, 2, Present),
                attendance(2, 2, 2, Absent),
                attendance(3, 1, 3, Present),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Snapshot::new(
            vec![student(1, "Ada", "Park"), student(1, "Ben", "Okafor")],
            vec![],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MetricsError::InputShape {
                record: RecordKind::Student,
                row: 2,
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_positive_totals() {
        let err = Snapshot::new(vec![], vec![assignment(3, "Broken", 0.0)], vec![], vec![])
            .unwrap_err();
        assert!(matches!(
            err,
            MetricsError::InputShape {
                record: RecordKind::Assignment,
                row: 1,
                ..
            }
        ));
    }

    #[test]
    fn class_report_views_agree() {
        let snapshot = sample();
        let report = snapshot.class_report().unwrap();

        assert_eq!(report.snapshot_id, snapshot.id());
        assert_eq!(report.students, snapshot.student_reports().unwrap());
        assert_eq!(report.assignments, snapshot.assignment_stats().unwrap());
        assert_eq!(report.distribution, snapshot.grade_distribution().unwrap());
        assert_eq!(report.distribution.total(), snapshot.students().len());

        // the grade for student 5 is dropped everywhere it matters
        assert_eq!(report.excluded.len(), 1);
        assert_eq!(report.assignments[1].students_graded, 1);
        assert_eq!(report.dashboard.recent_activity.len(), 3);
    }

    #[test]
    fn recomputation_is_stable() {
        let snapshot = sample();
        let first = snapshot.dashboard().unwrap();
        let second = snapshot.dashboard().unwrap();
        assert_eq!(first, second);
        assert_eq!(snapshot.attendance_calendar().len(), 2);
        assert_eq!(snapshot.attendance_on(crate::fixtures::day(2)).tally.total(), 2);
    }
}
