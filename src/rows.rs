//! Raw rows as they come out of a store, before validation.
//!
//! Every field is optional here; `into_record` turns a row into its typed
//! record or fails with [`MetricsError::InputShape`].

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{MetricsError, RecordKind};
use crate::models::{
    Assignment, AssignmentCategory, AttendanceRecord, AttendanceStatus, Grade, Student,
};

fn required<T>(
    value: Option<T>,
    record: RecordKind,
    row: usize,
    field: &str,
) -> Result<T, MetricsError> {
    value.ok_or_else(|| MetricsError::input_shape(record, row, format!("missing {field}")))
}

fn required_text(
    value: Option<String>,
    record: RecordKind,
    row: usize,
    field: &str,
) -> Result<String, MetricsError> {
    let text = required(value, record, row, field)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MetricsError::input_shape(record, row, format!("blank {field}")));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentRow {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: Option<NaiveDate>,
    pub photo: Option<String>,
    pub parent_contact: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
}

impl StudentRow {
    pub fn into_record(self, row: usize) -> Result<Student, MetricsError> {
        let kind = RecordKind::Student;
        Ok(Student {
            id: required(self.id, kind, row, "id")?,
            first_name: required_text(self.first_name, kind, row, "first_name")?,
            last_name: required_text(self.last_name, kind, row, "last_name")?,
            email: required_text(self.email, kind, row, "email")?,
            date_of_birth: self.date_of_birth,
            enrollment_date: required(self.enrollment_date, kind, row, "enrollment_date")?,
            photo: optional_text(self.photo),
            parent_contact: optional_text(self.parent_contact),
            address: optional_text(self.address),
            emergency_contact: optional_text(self.emergency_contact),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentRow {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub total_points: Option<f64>,
    pub due_date: Option<NaiveDate>,
    pub created_date: Option<NaiveDate>,
}

impl AssignmentRow {
    pub fn into_record(self, row: usize) -> Result<Assignment, MetricsError> {
        let kind = RecordKind::Assignment;
        let category = required_text(self.category, kind, row, "category")?
            .parse::<AssignmentCategory>()
            .map_err(|problem: String| MetricsError::input_shape(kind, row, problem))?;
        let total_points = required(self.total_points, kind, row, "total_points")?;
        if !(total_points > 0.0) {
            return Err(MetricsError::input_shape(
                kind,
                row,
                format!("total_points must be positive, got {total_points}"),
            ));
        }

        Ok(Assignment {
            id: required(self.id, kind, row, "id")?,
            title: required_text(self.title, kind, row, "title")?,
            description: optional_text(self.description),
            category,
            total_points,
            due_date: required(self.due_date, kind, row, "due_date")?,
            created_date: self.created_date,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeRow {
    pub id: Option<i64>,
    pub student_id: Option<i64>,
    pub assignment_id: Option<i64>,
    pub score: Option<f64>,
    pub submitted_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl GradeRow {
    pub fn into_record(self, row: usize) -> Result<Grade, MetricsError> {
        let kind = RecordKind::Grade;
        let score = required(self.score, kind, row, "score")?;
        if !score.is_finite() {
            return Err(MetricsError::input_shape(kind, row, "score is not a number"));
        }

        Ok(Grade {
            id: required(self.id, kind, row, "id")?,
            student_id: required(self.student_id, kind, row, "student_id")?,
            assignment_id: required(self.assignment_id, kind, row, "assignment_id")?,
            score,
            submitted_date: required(self.submitted_date, kind, row, "submitted_date")?,
            notes: optional_text(self.notes),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceRow {
    pub id: Option<i64>,
    pub student_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl AttendanceRow {
    pub fn into_record(self, row: usize) -> Result<AttendanceRecord, MetricsError> {
        let kind = RecordKind::Attendance;
        let status = required_text(self.status, kind, row, "status")?
            .parse::<AttendanceStatus>()
            .map_err(|problem: String| MetricsError::input_shape(kind, row, problem))?;

        Ok(AttendanceRecord {
            id: required(self.id, kind, row, "id")?,
            student_id: required(self.student_id, kind, row, "student_id")?,
            date: required(self.date, kind, row, "date")?,
            status,
            notes: optional_text(self.notes),
        })
    }
}
