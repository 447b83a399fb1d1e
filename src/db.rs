use std::fmt;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};

use crate::csv_store::CsvStore;
use crate::models::{
    Assignment, AssignmentCategory, AttendanceRecord, AttendanceStatus, Grade, Student,
};
use crate::rows::{AssignmentRow, AttendanceRow, GradeRow, StudentRow};
use crate::store::{load_snapshot, EntityStore};

/// Postgres-backed store; tables live in the `classroom` schema.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to Postgres")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn init_db(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Inserts a small demo class; existing rows with the same ids are
    /// overwritten.
    pub async fn seed(&self) -> anyhow::Result<WriteCounts> {
        let (students, assignments, grades, attendance) = seed_class()?;
        self.write_all(&students, &assignments, &grades, &attendance)
            .await
    }

    /// Upserts the four CSV files of `dir` by id, in one transaction. The
    /// files are validated as a whole before anything is written.
    pub async fn import_csv_dir(&self, dir: &Path) -> anyhow::Result<WriteCounts> {
        let snapshot = load_snapshot(&CsvStore::new(dir))
            .await
            .with_context(|| format!("failed to read class files from {}", dir.display()))?;
        self.write_all(
            snapshot.students(),
            snapshot.assignments(),
            snapshot.grades(),
            snapshot.attendance(),
        )
        .await
    }

    async fn write_all(
        &self,
        students: &[Student],
        assignments: &[Assignment],
        grades: &[Grade],
        attendance: &[AttendanceRecord],
    ) -> anyhow::Result<WriteCounts> {
        let mut tx = self.pool.begin().await?;
        for student in students {
            upsert_student(&mut tx, student).await?;
        }
        for assignment in assignments {
            upsert_assignment(&mut tx, assignment).await?;
        }
        for grade in grades {
            upsert_grade(&mut tx, grade).await?;
        }
        for record in attendance {
            upsert_attendance(&mut tx, record).await?;
        }
        tx.commit().await?;

        Ok(WriteCounts {
            students: students.len(),
            assignments: assignments.len(),
            grades: grades.len(),
            attendance: attendance.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteCounts {
    pub students: usize,
    pub assignments: usize,
    pub grades: usize,
    pub attendance: usize,
}

impl fmt::Display for WriteCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} students, {} assignments, {} grades, {} attendance records",
            self.students, self.assignments, self.grades, self.attendance
        )
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn students(&self) -> anyhow::Result<Vec<Student>> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, email, date_of_birth, enrollment_date, \
             photo, parent_contact, address, emergency_contact \
             FROM classroom.students ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch students")?;

        let mut students = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            students.push(student_row(row)?.into_record(index + 1)?);
        }
        Ok(students)
    }

    async fn assignments(&self) -> anyhow::Result<Vec<Assignment>> {
        let rows = sqlx::query(
            "SELECT id, title, description, category, total_points, due_date, created_date \
             FROM classroom.assignments ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch assignments")?;

        let mut assignments = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            assignments.push(assignment_row(row)?.into_record(index + 1)?);
        }
        Ok(assignments)
    }

    async fn grades(&self) -> anyhow::Result<Vec<Grade>> {
        let rows = sqlx::query(
            "SELECT id, student_id, assignment_id, score, submitted_date, notes \
             FROM classroom.grades ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch grades")?;

        let mut grades = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            grades.push(grade_row(row)?.into_record(index + 1)?);
        }
        Ok(grades)
    }

    async fn attendance(&self) -> anyhow::Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query(
            "SELECT id, student_id, date, status, notes \
             FROM classroom.attendance ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch attendance")?;

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            records.push(attendance_row(row)?.into_record(index + 1)?);
        }
        Ok(records)
    }
}

fn student_row(row: &PgRow) -> Result<StudentRow, sqlx::Error> {
    Ok(StudentRow {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        date_of_birth: row.try_get("date_of_birth")?,
        enrollment_date: row.try_get("enrollment_date")?,
        photo: row.try_get("photo")?,
        parent_contact: row.try_get("parent_contact")?,
        address: row.try_get("address")?,
        emergency_contact: row.try_get("emergency_contact")?,
    })
}

fn assignment_row(row: &PgRow) -> Result<AssignmentRow, sqlx::Error> {
    Ok(AssignmentRow {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        total_points: row.try_get("total_points")?,
        due_date: row.try_get("due_date")?,
        created_date: row.try_get("created_date")?,
    })
}

fn grade_row(row: &PgRow) -> Result<GradeRow, sqlx::Error> {
    Ok(GradeRow {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        assignment_id: row.try_get("assignment_id")?,
        score: row.try_get("score")?,
        submitted_date: row.try_get("submitted_date")?,
        notes: row.try_get("notes")?,
    })
}

fn attendance_row(row: &PgRow) -> Result<AttendanceRow, sqlx::Error> {
    Ok(AttendanceRow {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        date: row.try_get("date")?,
        status: row.try_get("status")?,
        notes: row.try_get("notes")?,
    })
}

async fn upsert_student(conn: &mut PgConnection, student: &Student) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO classroom.students
        (id, first_name, last_name, email, date_of_birth, enrollment_date,
         photo, parent_contact, address, emergency_contact)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO UPDATE
        SET first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            email = EXCLUDED.email,
            date_of_birth = EXCLUDED.date_of_birth,
            enrollment_date = EXCLUDED.enrollment_date,
            photo = EXCLUDED.photo,
            parent_contact = EXCLUDED.parent_contact,
            address = EXCLUDED.address,
            emergency_contact = EXCLUDED.emergency_contact
        "#,
    )
    .bind(student.id)
    .bind(&student.first_name)
    .bind(&student.last_name)
    .bind(&student.email)
    .bind(student.date_of_birth)
    .bind(student.enrollment_date)
    .bind(&student.photo)
    .bind(&student.parent_contact)
    .bind(&student.address)
    .bind(&student.emergency_contact)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("failed to write student {}", student.id))?;
    Ok(())
}

async fn upsert_assignment(conn: &mut PgConnection, assignment: &Assignment) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO classroom.assignments
        (id, title, description, category, total_points, due_date, created_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE
        SET title = EXCLUDED.title,
            description = EXCLUDED.description,
            category = EXCLUDED.category,
            total_points = EXCLUDED.total_points,
            due_date = EXCLUDED.due_date,
            created_date = EXCLUDED.created_date
        "#,
    )
    .bind(assignment.id)
    .bind(&assignment.title)
    .bind(&assignment.description)
    .bind(assignment.category.as_str())
    .bind(assignment.total_points)
    .bind(assignment.due_date)
    .bind(assignment.created_date)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("failed to write assignment {}", assignment.id))?;
    Ok(())
}

async fn upsert_grade(conn: &mut PgConnection, grade: &Grade) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO classroom.grades
        (id, student_id, assignment_id, score, submitted_date, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE
        SET student_id = EXCLUDED.student_id,
            assignment_id = EXCLUDED.assignment_id,
            score = EXCLUDED.score,
            submitted_date = EXCLUDED.submitted_date,
            notes = EXCLUDED.notes
        "#,
    )
    .bind(grade.id)
    .bind(grade.student_id)
    .bind(grade.assignment_id)
    .bind(grade.score)
    .bind(grade.submitted_date)
    .bind(&grade.notes)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("failed to write grade {}", grade.id))?;
    Ok(())
}

async fn upsert_attendance(conn: &mut PgConnection, record: &AttendanceRecord) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO classroom.attendance (id, student_id, date, status, notes)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE
        SET student_id = EXCLUDED.student_id,
            date = EXCLUDED.date,
            status = EXCLUDED.status,
            notes = EXCLUDED.notes
        "#,
    )
    .bind(record.id)
    .bind(record.student_id)
    .bind(record.date)
    .bind(record.status.as_str())
    .bind(&record.notes)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("failed to write attendance record {}", record.id))?;
    Ok(())
}

type SeedClass = (
    Vec<Student>,
    Vec<Assignment>,
    Vec<Grade>,
    Vec<AttendanceRecord>,
);

fn date(y: i32, m: u32, d: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).context("invalid date")
}

fn seed_class() -> anyhow::Result<SeedClass> {
    let enrolled = date(2025, 9, 2)?;
    let students: Vec<Student> = [
        (1, "Avery", "Lee", "avery.lee@example.edu", Some("555-0142")),
        (2, "Jules", "Moreno", "jules.moreno@example.edu", None),
        (3, "Kiara", "Patel", "kiara.patel@example.edu", Some("555-0199")),
        (4, "Noah", "Bennett", "noah.bennett@example.edu", None),
    ]
    .into_iter()
    .map(|(id, first, last, email, parent)| Student {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        date_of_birth: None,
        enrollment_date: enrolled,
        photo: None,
        parent_contact: parent.map(str::to_string),
        address: None,
        emergency_contact: None,
    })
    .collect();

    let assignments = vec![
        Assignment {
            id: 1,
            title: "Fractions Quiz".to_string(),
            description: Some("Adding and simplifying fractions".to_string()),
            category: AssignmentCategory::Quiz,
            total_points: 20.0,
            due_date: date(2025, 10, 3)?,
            created_date: Some(date(2025, 9, 22)?),
        },
        Assignment {
            id: 2,
            title: "Ecosystems Lab".to_string(),
            description: None,
            category: AssignmentCategory::Lab,
            total_points: 50.0,
            due_date: date(2025, 10, 10)?,
            created_date: Some(date(2025, 9, 29)?),
        },
        Assignment {
            id: 3,
            title: "Book Report".to_string(),
            description: Some("Two pages on a novel of your choice".to_string()),
            category: AssignmentCategory::Essay,
            total_points: 100.0,
            due_date: date(2025, 10, 24)?,
            created_date: Some(date(2025, 10, 1)?),
        },
    ];

    let grade_rows = [
        (1, 1, 1, 19.0, (2025, 10, 3)),
        (2, 2, 1, 14.5, (2025, 10, 3)),
        (3, 3, 1, 17.0, (2025, 10, 4)),
        (4, 1, 2, 46.0, (2025, 10, 10)),
        (5, 3, 2, 31.0, (2025, 10, 11)),
        (6, 1, 3, 88.0, (2025, 10, 24)),
        (7, 2, 3, 72.0, (2025, 10, 24)),
    ];
    let mut grades = Vec::with_capacity(grade_rows.len());
    for (id, student_id, assignment_id, score, (y, m, d)) in grade_rows {
        grades.push(Grade {
            id,
            student_id,
            assignment_id,
            score,
            submitted_date: date(y, m, d)?,
            notes: None,
        });
    }

    let attendance_rows = [
        (1, 1, 6, AttendanceStatus::Present),
        (2, 2, 6, AttendanceStatus::Present),
        (3, 3, 6, AttendanceStatus::Late),
        (4, 4, 6, AttendanceStatus::Absent),
        (5, 1, 7, AttendanceStatus::Present),
        (6, 2, 7, AttendanceStatus::Absent),
        (7, 3, 7, AttendanceStatus::Present),
        (8, 4, 7, AttendanceStatus::Present),
    ];
    let mut attendance = Vec::with_capacity(attendance_rows.len());
    for (id, student_id, day, status) in attendance_rows {
        attendance.push(AttendanceRecord {
            id,
            student_id,
            date: date(2025, 10, day)?,
            status,
            notes: None,
        });
    }

    Ok((students, assignments, grades, attendance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;

    #[test]
    fn seed_class_is_a_valid_snapshot() {
        let (students, assignments, grades, attendance) = seed_class().unwrap();
        let snapshot = Snapshot::new(students, assignments, grades, attendance).unwrap();

        assert!(snapshot.referential_gaps().is_empty());
        let distribution = snapshot.grade_distribution().unwrap();
        assert_eq!(distribution.total(), 4);
        // Noah has no grades yet
        assert_eq!(distribution.ungraded, 1);
    }

    #[test]
    fn write_counts_read_naturally() {
        let counts = WriteCounts {
            students: 4,
            assignments: 3,
            grades: 7,
            attendance: 8,
        };
        assert_eq!(
            counts.to_string(),
            "4 students, 3 assignments, 7 grades, 8 attendance records"
        );
    }
}
