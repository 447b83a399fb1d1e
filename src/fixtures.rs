//! Record builders for unit tests.

use chrono::NaiveDate;

use crate::models::{
    Assignment, AssignmentCategory, AttendanceRecord, AttendanceStatus, Grade, Student,
};

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, d).expect("valid february date")
}

pub fn student(id: i64, first: &str, last: &str) -> Student {
    Student {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@example.edu", first.to_lowercase(), last.to_lowercase()),
        date_of_birth: None,
        enrollment_date: day(1),
        photo: None,
        parent_contact: None,
        address: None,
        emergency_contact: None,
    }
}

pub fn assignment(id: i64, title: &str, total_points: f64) -> Assignment {
    Assignment {
        id,
        title: title.to_string(),
        description: None,
        category: AssignmentCategory::Quiz,
        total_points,
        due_date: day(20),
        created_date: Some(day(1)),
    }
}

pub fn grade(id: i64, student_id: i64, assignment_id: i64, score: f64, submitted: u32) -> Grade {
    Grade {
        id,
        student_id,
        assignment_id,
        score,
        submitted_date: day(submitted),
        notes: None,
    }
}

pub fn attendance(id: i64, student_id: i64, on: u32, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        id,
        student_id,
        date: day(on),
        status,
        notes: None,
    }
}
