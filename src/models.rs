use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::attendance::AttendanceTally;
use crate::band::GradeBand;

pub type StudentId = i64;
pub type AssignmentId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: NaiveDate,
    pub photo: Option<String>,
    pub parent_contact: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentCategory {
    Quiz,
    Test,
    Essay,
    Project,
    Lab,
    Homework,
    Portfolio,
    Assessment,
}

impl AssignmentCategory {
    pub const ALL: [AssignmentCategory; 8] = [
        AssignmentCategory::Quiz,
        AssignmentCategory::Test,
        AssignmentCategory::Essay,
        AssignmentCategory::Project,
        AssignmentCategory::Lab,
        AssignmentCategory::Homework,
        AssignmentCategory::Portfolio,
        AssignmentCategory::Assessment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentCategory::Quiz => "Quiz",
            AssignmentCategory::Test => "Test",
            AssignmentCategory::Essay => "Essay",
            AssignmentCategory::Project => "Project",
            AssignmentCategory::Lab => "Lab",
            AssignmentCategory::Homework => "Homework",
            AssignmentCategory::Portfolio => "Portfolio",
            AssignmentCategory::Assessment => "Assessment",
        }
    }
}

impl fmt::Display for AssignmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        AssignmentCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown assignment category '{trimmed}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub title: String,
    pub description: Option<String>,
    pub category: AssignmentCategory,
    pub total_points: f64,
    pub due_date: NaiveDate,
    pub created_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: i64,
    pub student_id: StudentId,
    pub assignment_id: AssignmentId,
    pub score: f64,
    pub submitted_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            other => Err(format!("unknown attendance status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// Per-student performance row.
///
/// `average` is `None` when the student has no graded assignments, which is
/// not the same thing as scoring 0%. `attendance_rate` has no such
/// distinction: a student without attendance records reports 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student_id: StudentId,
    pub student_name: String,
    pub email: String,
    pub average: Option<i64>,
    pub band: Option<GradeBand>,
    pub gpa: Option<f64>,
    pub attendance_rate: u32,
    pub attendance: AttendanceTally,
    pub assignments_completed: usize,
    pub total_assignments: usize,
    pub total_attendance_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStat {
    pub assignment_id: AssignmentId,
    pub title: String,
    pub category: AssignmentCategory,
    pub total_points: f64,
    pub due_date: NaiveDate,
    pub students_graded: usize,
    pub class_size: usize,
    /// Mean raw score, one decimal place; 0 when nobody is graded.
    pub average_score: f64,
    pub average_percentage: i64,
    pub band: GradeBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentGrade {
    pub grade_id: i64,
    pub student_id: StudentId,
    pub student_name: String,
    pub assignment_id: AssignmentId,
    pub assignment_title: String,
    pub score: f64,
    pub total_points: f64,
    pub percentage: i64,
    pub submitted_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_assignments: usize,
    pub total_grades: usize,
    /// One weight per grade, not per student.
    pub class_average: i64,
    pub attendance_rate: u32,
    pub recent_activity: Vec<RecentGrade>,
}
