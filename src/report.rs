use std::collections::HashMap;

use serde::Serialize;

use crate::attendance::{self, AttendanceTally};
use crate::band::GradeBand;
use crate::error::MetricsError;
use crate::gradebook::{ColumnAccumulator, ColumnStats, GradeIndex, GradebookMatrix};
use crate::lookup::References;
use crate::metrics::{gpa, rate};
use crate::models::{
    Assignment, AssignmentId, AssignmentStat, AttendanceRecord, Grade, Student, StudentReport,
};

/// Student count per band. `ungraded` is informational: those students are
/// already counted in `f`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GradeDistribution {
    #[serde(rename = "A")]
    pub a: usize,
    #[serde(rename = "B")]
    pub b: usize,
    #[serde(rename = "C")]
    pub c: usize,
    #[serde(rename = "D")]
    pub d: usize,
    #[serde(rename = "F")]
    pub f: usize,
    pub ungraded: usize,
}

impl GradeDistribution {
    pub fn count(&self, band: GradeBand) -> usize {
        match band {
            GradeBand::A => self.a,
            GradeBand::B => self.b,
            GradeBand::C => self.c,
            GradeBand::D => self.d,
            GradeBand::F => self.f,
        }
    }

    fn bump(&mut self, band: GradeBand) {
        match band {
            GradeBand::A => self.a += 1,
            GradeBand::B => self.b += 1,
            GradeBand::C => self.c += 1,
            GradeBand::D => self.d += 1,
            GradeBand::F => self.f += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b + self.c + self.d + self.f
    }

    /// Whole-number share of the class in `band`.
    pub fn share(&self, band: GradeBand) -> u32 {
        rate(self.count(band), self.total())
    }

    pub fn iter(&self) -> impl Iterator<Item = (GradeBand, usize)> + '_ {
        GradeBand::ALL.into_iter().map(|band| (band, self.count(band)))
    }
}

pub fn student_reports(
    students: &[Student],
    assignments: &[Assignment],
    grades: &[Grade],
    attendance: &[AttendanceRecord],
) -> Result<Vec<StudentReport>, MetricsError> {
    let matrix = GradebookMatrix::build(students, assignments, grades)?;
    Ok(student_reports_from(&matrix, attendance))
}

/// Student rows for an already built gradebook, in the matrix's student
/// order.
pub fn student_reports_from(
    matrix: &GradebookMatrix<'_>,
    attendance: &[AttendanceRecord],
) -> Vec<StudentReport> {
    let refs = matrix.references();
    let records = attendance::attributable(&refs, attendance);
    let tallies = attendance::by_student(&records);
    let total_assignments = matrix.assignments().len();

    matrix
        .students()
        .iter()
        .zip(matrix.rows())
        .map(|(student, row)| {
            let tally: AttendanceTally = tallies.get(&student.id).copied().unwrap_or_default();
            StudentReport {
                student_id: student.id,
                student_name: student.full_name(),
                email: student.email.clone(),
                average: row.average,
                band: row.band(),
                gpa: row.raw_average.map(gpa),
                attendance_rate: tally.present_rate(),
                attendance: tally,
                assignments_completed: row.graded_count,
                total_assignments,
                total_attendance_records: tally.total(),
            }
        })
        .collect()
}

/// Bands every student by their rounded average. Students with no grades
/// count as 0% and therefore land in F.
pub fn grade_distribution(reports: &[StudentReport]) -> GradeDistribution {
    let mut distribution = GradeDistribution::default();
    for report in reports {
        if report.average.is_none() {
            distribution.ungraded += 1;
        }
        let average = report.average.unwrap_or(0);
        distribution.bump(GradeBand::classify(average as f64));
    }
    distribution
}

/// Per-assignment statistics when only a student count is at hand. Duplicate
/// grades collapse the same way they do in the gradebook; grades for unknown
/// assignments are skipped.
pub fn assignment_stats(
    assignments: &[Assignment],
    grades: &[Grade],
    student_count: usize,
) -> Result<Vec<AssignmentStat>, MetricsError> {
    let refs = References::new(&[], assignments);
    let index = GradeIndex::build(grades, "assignment stats", |grade| {
        refs.grade_assignment(grade).map(|_| ())
    });

    let mut columns: HashMap<AssignmentId, ColumnAccumulator> = HashMap::new();
    for grade in grades {
        let kept = index
            .cells
            .get(&(grade.student_id, grade.assignment_id))
            .is_some_and(|kept| std::ptr::eq(*kept, grade));
        if kept {
            columns
                .entry(grade.assignment_id)
                .or_default()
                .push(grade.score);
        }
    }

    assignments
        .iter()
        .map(|assignment| {
            let stats = columns
                .remove(&assignment.id)
                .unwrap_or_default()
                .finish(assignment, student_count)?;
            Ok(assignment_stat(assignment, &stats))
        })
        .collect()
}

/// Per-assignment statistics read off a built gradebook.
pub fn assignment_stats_from(matrix: &GradebookMatrix<'_>) -> Vec<AssignmentStat> {
    matrix
        .assignments()
        .iter()
        .zip(matrix.columns())
        .map(|(assignment, stats)| assignment_stat(assignment, stats))
        .collect()
}

fn assignment_stat(assignment: &Assignment, stats: &ColumnStats) -> AssignmentStat {
    let average_percentage = stats.mean_percentage.unwrap_or(0);
    AssignmentStat {
        assignment_id: assignment.id,
        title: assignment.title.clone(),
        category: assignment.category,
        total_points: assignment.total_points,
        due_date: assignment.due_date,
        students_graded: stats.graded_count,
        class_size: stats.class_size,
        average_score: stats.mean_score.unwrap_or(0.0),
        average_percentage,
        band: GradeBand::classify(average_percentage as f64),
    }
}
