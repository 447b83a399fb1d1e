//! Class-wide summary shown on the landing page.
//!
//! `class_average` weighs every grade equally, so it drifts from the mean of
//! per-student averages whenever some students have more grades than others.

use std::cmp::Ordering;

use crate::attendance::{self, AttendanceTally};
use crate::error::MetricsError;
use crate::lookup::{note_excluded, References};
use crate::metrics::{average, percentage, ratio_percent, round_half_up};
use crate::models::{
    Assignment, AttendanceRecord, DashboardStats, Grade, RecentGrade, Student,
};

pub const RECENT_ACTIVITY_LIMIT: usize = 5;

pub fn dashboard_summary(
    students: &[Student],
    assignments: &[Assignment],
    grades: &[Grade],
    attendance: &[AttendanceRecord],
) -> Result<DashboardStats, MetricsError> {
    let refs = References::new(students, assignments);

    let mut percents = Vec::with_capacity(grades.len());
    for grade in grades {
        match refs.grade_assignment(grade) {
            Ok(assignment) => percents.push(ratio_percent(grade.score, assignment.total_points)?),
            Err(err) => note_excluded("class average", &err),
        }
    }

    let records = attendance::attributable(&refs, attendance);
    let tally: AttendanceTally = records.iter().copied().collect();

    Ok(DashboardStats {
        total_students: students.len(),
        total_assignments: assignments.len(),
        total_grades: grades.len(),
        class_average: round_half_up(average(&percents)) as i64,
        attendance_rate: tally.present_rate(),
        recent_activity: latest_grades(&refs, grades, RECENT_ACTIVITY_LIMIT)?,
    })
}

/// The `limit` most recently submitted grades, newest first. Grades
/// submitted on the same day are ordered by descending id.
pub fn recent_activity(
    students: &[Student],
    assignments: &[Assignment],
    grades: &[Grade],
    limit: usize,
) -> Result<Vec<RecentGrade>, MetricsError> {
    let refs = References::new(students, assignments);
    latest_grades(&refs, grades, limit)
}

fn latest_grades(
    refs: &References<'_>,
    grades: &[Grade],
    limit: usize,
) -> Result<Vec<RecentGrade>, MetricsError> {
    let mut resolved: Vec<(&Grade, &Student, &Assignment)> = grades
        .iter()
        .filter_map(|grade| match refs.grade(grade) {
            Ok((student, assignment)) => Some((grade, student, assignment)),
            Err(err) => {
                note_excluded("recent activity", &err);
                None
            }
        })
        .collect();

    resolved.sort_by(|(a, ..), (b, ..)| newest_first(a, b));

    resolved
        .into_iter()
        .take(limit)
        .map(|(grade, student, assignment)| {
            Ok(RecentGrade {
                grade_id: grade.id,
                student_id: student.id,
                student_name: student.full_name(),
                assignment_id: assignment.id,
                assignment_title: assignment.title.clone(),
                score: grade.score,
                total_points: assignment.total_points,
                percentage: percentage(grade.score, assignment.total_points)?,
                submitted_date: grade.submitted_date,
            })
        })
        .collect()
}

fn newest_first(a: &Grade, b: &Grade) -> Ordering {
    b.submitted_date
        .cmp(&a.submitted_date)
        .then_with(|| b.id.cmp(&a.id))
}
