use chrono::NaiveDate;

use classroom_metrics::csv_store::CsvStore;
use classroom_metrics::dashboard::recent_activity;
use classroom_metrics::models::{
    Assignment, AssignmentCategory, AttendanceRecord, AttendanceStatus, Grade, Student,
};
use classroom_metrics::store::{load_snapshot, MemoryStore};
use classroom_metrics::{
    assignment_stats, build_gradebook_matrix, classify, dashboard_summary, grade_distribution,
    percentage, rate, student_reports, Cell, GradeBand, MetricsError, Snapshot,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn student(id: i64, first: &str, last: &str) -> Student {
    Student {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@example.edu", first.to_lowercase()),
        date_of_birth: None,
        enrollment_date: day(1),
        photo: None,
        parent_contact: None,
        address: None,
        emergency_contact: None,
    }
}

fn assignment(id: i64, title: &str, total_points: f64) -> Assignment {
    Assignment {
        id,
        title: title.to_string(),
        description: None,
        category: AssignmentCategory::Test,
        total_points,
        due_date: day(28),
        created_date: None,
    }
}

fn grade(id: i64, student_id: i64, assignment_id: i64, score: f64, on: u32) -> Grade {
    Grade {
        id,
        student_id,
        assignment_id,
        score,
        submitted_date: day(on),
        notes: None,
    }
}

fn present(id: i64, student_id: i64, on: u32) -> AttendanceRecord {
    AttendanceRecord {
        id,
        student_id,
        date: day(on),
        status: AttendanceStatus::Present,
        notes: None,
    }
}

#[test]
fn single_grade_sets_average_and_band() {
    let students = vec![student(1, "Ada", "Park")];
    let assignments = vec![assignment(1, "Unit Test", 100.0)];
    let grades = vec![grade(1, 1, 1, 85.0, 5)];

    let reports = student_reports(&students, &assignments, &grades, &[]).unwrap();
    assert_eq!(reports[0].average, Some(85));
    assert_eq!(reports[0].band, Some(GradeBand::B));
    assert_eq!(reports[0].assignments_completed, 1);
    assert_eq!(reports[0].total_assignments, 1);
}

#[test]
fn ungraded_student_lands_in_f() {
    let students = vec![student(1, "Ada", "Park")];
    let assignments = vec![assignment(1, "Unit Test", 100.0)];

    let reports = student_reports(&students, &assignments, &[], &[]).unwrap();
    assert_eq!(reports[0].average, None);
    assert_eq!(reports[0].gpa, None);

    let distribution = grade_distribution(&reports);
    assert_eq!(distribution.f, 1);
    assert_eq!(distribution.ungraded, 1);
    assert_eq!(distribution.total(), 1);
}

#[test]
fn grade_for_unknown_assignment_is_excluded_not_fatal() {
    let students = vec![student(1, "Ada", "Park")];
    let assignments = vec![assignment(1, "Unit Test", 100.0)];
    let grades = vec![grade(1, 1, 1, 90.0, 5), grade(2, 1, 999, 10.0, 6)];

    let matrix = build_gradebook_matrix(&students, &assignments, &grades).unwrap();
    assert_eq!(matrix.excluded().len(), 1);
    assert!(matches!(
        matrix.excluded()[0],
        MetricsError::ReferentialGap {
            target_id: 999,
            ..
        }
    ));
    assert!(matches!(matrix.cell(1, 1), Cell::Graded { percentage: 90, .. }));

    let reports = student_reports(&students, &assignments, &grades, &[]).unwrap();
    assert_eq!(reports[0].average, Some(90));

    let stats = assignment_stats(&assignments, &grades, students.len()).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].students_graded, 1);

    let dashboard = dashboard_summary(&students, &assignments, &grades, &[]).unwrap();
    assert_eq!(dashboard.total_grades, 2);
    assert_eq!(dashboard.class_average, 90);
    assert_eq!(dashboard.recent_activity.len(), 1);
}

#[test]
fn band_boundaries() {
    assert_eq!(classify(90.0), GradeBand::A);
    assert_eq!(classify(89.999), GradeBand::B);
    assert_eq!(classify(80.0), GradeBand::B);
    assert_eq!(classify(79.5), GradeBand::C);
    assert_eq!(classify(70.0), GradeBand::C);
    assert_eq!(classify(60.0), GradeBand::D);
    assert_eq!(classify(59.9), GradeBand::F);
    assert_eq!(classify(0.0), GradeBand::F);
    assert_eq!(classify(104.0), GradeBand::A);
}

#[test]
fn percentage_and_rate_edges() {
    assert_eq!(percentage(17.0, 20.0).unwrap(), 85);
    assert_eq!(percentage(2.0, 3.0).unwrap(), 67);
    assert_eq!(percentage(1.0, 8.0).unwrap(), 13);
    assert!(matches!(
        percentage(5.0, 0.0),
        Err(MetricsError::Division { .. })
    ));
    assert_eq!(rate(0, 0), 0);
    assert_eq!(rate(2, 3), 67);
}

#[test]
fn distribution_covers_every_student() {
    let students: Vec<Student> = (1..=6).map(|id| student(id, "S", &id.to_string())).collect();
    let assignments = vec![assignment(1, "Unit Test", 50.0)];
    let grades = vec![
        grade(1, 1, 1, 50.0, 2),
        grade(2, 2, 1, 41.0, 2),
        grade(3, 3, 1, 36.0, 2),
        grade(4, 4, 1, 30.0, 2),
        grade(5, 5, 1, 10.0, 2),
    ];

    let reports = student_reports(&students, &assignments, &grades, &[]).unwrap();
    let distribution = grade_distribution(&reports);
    assert_eq!(distribution.total(), students.len());
    assert_eq!(
        distribution.iter().map(|(_, n)| n).collect::<Vec<_>>(),
        vec![1, 1, 1, 1, 2]
    );
    assert_eq!(distribution.ungraded, 1);
}

#[test]
fn recent_activity_is_capped_and_newest_first() {
    let students = vec![student(1, "Ada", "Park"), student(2, "Ben", "Okafor")];
    let assignments = vec![assignment(1, "Unit Test", 10.0), assignment(2, "Lab", 10.0)];
    let grades: Vec<Grade> = (1..=8)
        .map(|id| grade(id, 1 + id % 2, 1 + id % 2, 7.0, id as u32))
        .collect();

    let dashboard = dashboard_summary(&students, &assignments, &grades, &[]).unwrap();
    assert_eq!(dashboard.recent_activity.len(), 5);
    let ids: Vec<i64> = dashboard.recent_activity.iter().map(|r| r.grade_id).collect();
    assert_eq!(ids, vec![8, 7, 6, 5, 4]);

    let all = recent_activity(&students, &assignments, &grades, 100).unwrap();
    assert_eq!(all.len(), 8);
}

#[test]
fn dashboard_on_empty_class_is_all_zero() {
    let dashboard = dashboard_summary(&[], &[], &[], &[]).unwrap();
    assert_eq!(dashboard.total_students, 0);
    assert_eq!(dashboard.class_average, 0);
    assert_eq!(dashboard.attendance_rate, 0);
    assert!(dashboard.recent_activity.is_empty());
}

#[tokio::test]
async fn memory_store_feeds_a_consistent_snapshot() {
    let store = MemoryStore {
        students: vec![student(1, "Ada", "Park"), student(2, "Ben", "Okafor")],
        assignments: vec![assignment(1, "Unit Test", 20.0)],
        grades: vec![grade(1, 1, 1, 18.0, 3), grade(2, 7, 1, 4.0, 3)],
        attendance: vec![present(1, 1, 3), present(2, 2, 3), present(3, 9, 3)],
    };

    let snapshot: Snapshot = load_snapshot(&store).await.unwrap();
    let report = snapshot.class_report().unwrap();

    assert_eq!(report.students.len(), 2);
    assert_eq!(report.distribution.total(), 2);
    assert_eq!(report.dashboard.attendance_rate, 100);
    assert_eq!(report.attendance.len(), 1);
    assert_eq!(report.attendance[0].tally.present, 2);
    assert_eq!(report.excluded.len(), 2);
}

#[tokio::test]
async fn csv_directory_round_trips_into_reports() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("students.csv"),
        "id,first_name,last_name,email,date_of_birth,enrollment_date,photo,parent_contact,address,emergency_contact\n\
         1,Ada,Park,ada@example.edu,,2025-09-01,,,,\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("assignments.csv"),
        "id,title,description,category,total_points,due_date,created_date\n\
         1,Cells Lab,,lab,40,2025-10-03,\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("grades.csv"),
        "id,student_id,assignment_id,score,submitted_date,notes\n\
         1,1,1,30,2025-10-02,\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("attendance.csv"),
        "id,student_id,date,status,notes\n\
         1,1,2025-10-01,absent,\n",
    )
    .unwrap();

    let snapshot = load_snapshot(&CsvStore::new(dir.path())).await.unwrap();
    let reports = snapshot.student_reports().unwrap();
    assert_eq!(reports[0].average, Some(75));
    assert_eq!(reports[0].band, Some(GradeBand::C));
    assert_eq!(reports[0].attendance_rate, 0);
    assert_eq!(snapshot.assignments()[0].category, AssignmentCategory::Lab);
}
