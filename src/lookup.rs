use std::collections::HashMap;

use crate::error::{MetricsError, RecordKind};
use crate::models::{Assignment, AssignmentId, AttendanceRecord, Grade, Student, StudentId};

/// Id lookups over one snapshot, used to resolve the foreign keys of grades
/// and attendance records.
pub struct References<'a> {
    students: HashMap<StudentId, &'a Student>,
    assignments: HashMap<AssignmentId, &'a Assignment>,
}

impl<'a> References<'a> {
    pub fn new(students: &'a [Student], assignments: &'a [Assignment]) -> Self {
        Self::from_iters(students, assignments)
    }

    pub fn from_iters<S, A>(students: S, assignments: A) -> Self
    where
        S: IntoIterator<Item = &'a Student>,
        A: IntoIterator<Item = &'a Assignment>,
    {
        Self {
            students: students.into_iter().map(|s| (s.id, s)).collect(),
            assignments: assignments.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    pub fn student(&self, id: StudentId) -> Option<&'a Student> {
        self.students.get(&id).copied()
    }

    pub fn assignment(&self, id: AssignmentId) -> Option<&'a Assignment> {
        self.assignments.get(&id).copied()
    }

    pub fn grade_student(&self, grade: &Grade) -> Result<&'a Student, MetricsError> {
        self.student(grade.student_id)
            .ok_or(MetricsError::ReferentialGap {
                record: RecordKind::Grade,
                record_id: grade.id,
                target: RecordKind::Student,
                target_id: grade.student_id,
            })
    }

    pub fn grade_assignment(&self, grade: &Grade) -> Result<&'a Assignment, MetricsError> {
        self.assignment(grade.assignment_id)
            .ok_or(MetricsError::ReferentialGap {
                record: RecordKind::Grade,
                record_id: grade.id,
                target: RecordKind::Assignment,
                target_id: grade.assignment_id,
            })
    }

    /// Both ends of a grade; the student is checked first.
    pub fn grade(&self, grade: &Grade) -> Result<(&'a Student, &'a Assignment), MetricsError> {
        Ok((self.grade_student(grade)?, self.grade_assignment(grade)?))
    }

    pub fn attendance_student(
        &self,
        record: &AttendanceRecord,
    ) -> Result<&'a Student, MetricsError> {
        self.student(record.student_id)
            .ok_or(MetricsError::ReferentialGap {
                record: RecordKind::Attendance,
                record_id: record.id,
                target: RecordKind::Student,
                target_id: record.student_id,
            })
    }
}

/// Logs a referential gap that an aggregator is about to skip.
pub(crate) fn note_excluded(view: &'static str, err: &MetricsError) {
    tracing::warn!(view, "excluding record: {err}");
}

/// Every grade and attendance record that points at a missing student or
/// assignment, in input order.
pub fn referential_gaps(
    students: &[Student],
    assignments: &[Assignment],
    grades: &[Grade],
    attendance: &[AttendanceRecord],
) -> Vec<MetricsError> {
    let refs = References::new(students, assignments);
    let mut gaps = Vec::new();

    for grade in grades {
        if let Err(err) = refs.grade_student(grade) {
            gaps.push(err);
        }
        if let Err(err) = refs.grade_assignment(grade) {
            gaps.push(err);
        }
    }
    for record in attendance {
        if let Err(err) = refs.attendance_student(record) {
            gaps.push(err);
        }
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{assignment, attendance, grade, student};
    use crate::models::AttendanceStatus;

    #[test]
    fn resolves_known_references() {
        let students = vec![student(1, "Ada", "Park")];
        let assignments = vec![assignment(10, "Quiz 1", 20.0)];
        let refs = References::new(&students, &assignments);

        let (s, a) = refs.grade(&grade(1, 1, 10, 18.0, 3)).unwrap();
        assert_eq!(s.id, 1);
        assert_eq!(a.id, 10);
    }

    #[test]
    fn reports_each_dangling_reference() {
        let students = vec![student(1, "Ada", "Park")];
        let assignments = vec![assignment(10, "Quiz 1", 20.0)];
        let grades = vec![
            grade(1, 1, 10, 18.0, 3),
            grade(2, 1, 999, 5.0, 3),
            grade(3, 7, 999, 5.0, 3),
        ];
        let records = vec![
            attendance(1, 1, 2, AttendanceStatus::Present),
            attendance(2, 8, 2, AttendanceStatus::Absent),
        ];

        let gaps = referential_gaps(&students, &assignments, &grades, &records);
        assert_eq!(gaps.len(), 4);
        assert_eq!(
            gaps[0],
            MetricsError::ReferentialGap {
                record: RecordKind::Grade,
                record_id: 2,
                target: RecordKind::Assignment,
                target_id: 999,
            }
        );
        assert!(matches!(
            gaps[3],
            MetricsError::ReferentialGap {
                record: RecordKind::Attendance,
                target_id: 8,
                ..
            }
        ));
    }
}
