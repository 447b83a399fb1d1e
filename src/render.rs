//! Plain-text and markdown renderings of the computed views.

use std::fmt::Write;

use crate::attendance::DaySummary;
use crate::band::{attendance_status, GradeBand};
use crate::error::MetricsError;
use crate::gradebook::{Cell, GradebookMatrix};
use crate::models::{AssignmentStat, DashboardStats, StudentReport};
use crate::report::GradeDistribution;
use crate::snapshot::ClassReport;

const UNAVAILABLE: &str = "N/A";

fn average_label(average: Option<i64>) -> String {
    match average {
        Some(avg) => format!("{avg}%"),
        None => UNAVAILABLE.to_string(),
    }
}

pub fn gradebook_text(matrix: &GradebookMatrix<'_>) -> String {
    let mut output = String::new();
    if matrix.students().is_empty() || matrix.assignments().is_empty() {
        let _ = writeln!(output, "Gradebook needs both students and assignments.");
        return output;
    }

    let _ = write!(output, "{:<24}", "Student");
    for assignment in matrix.assignments() {
        let _ = write!(output, " {:>14}", truncate(&assignment.title, 14));
    }
    let _ = writeln!(output, " {:>8}", "Average");

    for (student, row) in matrix.students().iter().zip(matrix.rows()) {
        let _ = write!(output, "{:<24}", truncate(&student.full_name(), 24));
        for assignment in matrix.assignments() {
            let label = match matrix.cell(student.id, assignment.id) {
                Cell::Empty => "-".to_string(),
                Cell::Graded { grade, percentage } => format!(
                    "{}/{} {}%",
                    grade.score, assignment.total_points, percentage
                ),
            };
            let _ = write!(output, " {label:>14}");
        }
        let _ = writeln!(output, " {:>8}", average_label(row.average));
    }

    let _ = write!(output, "{:<24}", "Graded");
    for column in matrix.columns() {
        let label = format!("{}/{}", column.graded_count, column.class_size);
        let _ = write!(output, " {label:>14}");
    }
    let _ = writeln!(output);

    if !matrix.excluded().is_empty() {
        let _ = writeln!(
            output,
            "{} grade(s) excluded for missing references (see `audit`).",
            matrix.excluded().len()
        );
    }
    output
}

pub fn students_text(reports: &[StudentReport]) -> String {
    let mut output = String::new();
    if reports.is_empty() {
        let _ = writeln!(output, "No students enrolled.");
        return output;
    }
    for report in reports {
        let band = report.band.map(|b| b.letter()).unwrap_or("-");
        let gpa = report
            .gpa
            .map(|g| format!("{g:.2}"))
            .unwrap_or_else(|| UNAVAILABLE.to_string());
        let _ = writeln!(
            output,
            "- {} ({}) average {} [{}] GPA {} | attendance {}% ({}) over {} records | {}/{} assignments",
            report.student_name,
            report.email,
            average_label(report.average),
            band,
            gpa,
            report.attendance_rate,
            attendance_status(report.attendance_rate).as_str(),
            report.total_attendance_records,
            report.assignments_completed,
            report.total_assignments,
        );
    }
    output
}

pub fn assignments_text(stats: &[AssignmentStat]) -> String {
    let mut output = String::new();
    if stats.is_empty() {
        let _ = writeln!(output, "No assignments created.");
        return output;
    }
    for stat in stats {
        let _ = writeln!(
            output,
            "- {} ({}, {} pts, due {}): {}/{} graded, average {:.1}/{} ({}%, {})",
            stat.title,
            stat.category,
            stat.total_points,
            stat.due_date,
            stat.students_graded,
            stat.class_size,
            stat.average_score,
            stat.total_points,
            stat.average_percentage,
            stat.band,
        );
    }
    output
}

pub fn distribution_text(distribution: &GradeDistribution) -> String {
    let mut output = String::new();
    for (band, count) in distribution.iter() {
        let _ = writeln!(
            output,
            "- {}: {} student(s), {}% of class ({})",
            band,
            count,
            distribution.share(band),
            band.status().as_str()
        );
    }
    if distribution.ungraded > 0 {
        let _ = writeln!(
            output,
            "{} student(s) without grades are counted in F.",
            distribution.ungraded
        );
    }
    output
}

pub fn dashboard_text(stats: &DashboardStats) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Total students:   {}", stats.total_students);
    let _ = writeln!(output, "Assignments:      {}", stats.total_assignments);
    let _ = writeln!(output, "Grades recorded:  {}", stats.total_grades);
    let _ = writeln!(
        output,
        "Class average:    {}% ({})",
        stats.class_average,
        GradeBand::classify(stats.class_average as f64)
    );
    let _ = writeln!(output, "Attendance rate:  {}%", stats.attendance_rate);
    let _ = writeln!(output, "Recent activity:");
    if stats.recent_activity.is_empty() {
        let _ = writeln!(output, "  No grades recorded yet.");
    }
    for recent in &stats.recent_activity {
        let _ = writeln!(
            output,
            "  {} {} scored {}/{} ({}%) on {}",
            recent.submitted_date,
            recent.student_name,
            recent.score,
            recent.total_points,
            recent.percentage,
            recent.assignment_title
        );
    }
    output
}

pub fn attendance_text(days: &[DaySummary]) -> String {
    let mut output = String::new();
    if days.is_empty() {
        let _ = writeln!(output, "No attendance recorded.");
        return output;
    }
    for day in days {
        let _ = writeln!(
            output,
            "- {}: {} present, {} absent, {} late ({}% present)",
            day.date, day.tally.present, day.tally.absent, day.tally.late, day.present_rate
        );
    }
    output
}

pub fn gaps_text(gaps: &[MetricsError]) -> String {
    let mut output = String::new();
    if gaps.is_empty() {
        let _ = writeln!(output, "Every grade and attendance record resolves.");
        return output;
    }
    for gap in gaps {
        let _ = writeln!(output, "- {gap}");
    }
    output
}

pub fn class_report_markdown(report: &ClassReport) -> String {
    let mut output = String::new();
    let stats = &report.dashboard;

    let _ = writeln!(output, "# Class Report");
    let _ = writeln!(
        output,
        "Snapshot {} captured {}",
        report.snapshot_id,
        report.captured_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Students: {}", stats.total_students);
    let _ = writeln!(output, "- Assignments: {}", stats.total_assignments);
    let _ = writeln!(output, "- Grades recorded: {}", stats.total_grades);
    let _ = writeln!(output, "- Class average: {}%", stats.class_average);
    let _ = writeln!(output, "- Attendance rate: {}%", stats.attendance_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Student Performance");
    if report.students.is_empty() {
        let _ = writeln!(output, "No students enrolled.");
    } else {
        let _ = writeln!(output, "| Student | Average | Attendance | Assignments |");
        let _ = writeln!(output, "|---|---|---|---|");
        for student in &report.students {
            let _ = writeln!(
                output,
                "| {} | {} | {}% | {}/{} |",
                student.student_name,
                average_label(student.average),
                student.attendance_rate,
                student.assignments_completed,
                student.total_assignments
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignment Analysis");
    if report.assignments.is_empty() {
        let _ = writeln!(output, "No assignments created.");
    } else {
        let _ = writeln!(output, "| Assignment | Graded | Average Score | Average % | Due |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for stat in &report.assignments {
            let _ = writeln!(
                output,
                "| {} ({}) | {}/{} | {:.1}/{} | {}% | {} |",
                stat.title,
                stat.category,
                stat.students_graded,
                stat.class_size,
                stat.average_score,
                stat.total_points,
                stat.average_percentage,
                stat.due_date.format("%b %-d, %Y")
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Distribution");
    output.push_str(&distribution_text(&report.distribution));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");
    if stats.recent_activity.is_empty() {
        let _ = writeln!(output, "No grades recorded yet.");
    } else {
        for recent in &stats.recent_activity {
            let _ = writeln!(
                output,
                "- {} scored {}% on {} ({})",
                recent.student_name, recent.percentage, recent.assignment_title, recent.submitted_date
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Data Quality");
    output.push_str(&gaps_text(&report.excluded));

    output
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('~');
        short
    }
}
