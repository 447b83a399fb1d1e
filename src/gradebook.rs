//! Student x assignment gradebook.
//!
//! A cell is either empty or holds exactly one grade. Empty is not a zero:
//! it is left out of row and column statistics entirely.

use std::collections::HashMap;

use serde::Serialize;

use crate::band::GradeBand;
use crate::error::MetricsError;
use crate::lookup::{note_excluded, References};
use crate::metrics::{average, percentage, ratio_percent, round_half_up, round_one_decimal};
use crate::models::{Assignment, AssignmentId, Grade, Student, StudentId};

type CellKey = (StudentId, AssignmentId);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Empty,
    Graded { grade: &'a Grade, percentage: i64 },
}

impl<'a> Cell<'a> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn grade(&self) -> Option<&'a Grade> {
        match self {
            Cell::Empty => None,
            Cell::Graded { grade, .. } => Some(grade),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowStats {
    pub student_id: StudentId,
    pub graded_count: usize,
    /// Unrounded mean percentage over graded assignments.
    pub raw_average: Option<f64>,
    /// `None` means no graded assignments, not 0%.
    pub average: Option<i64>,
}

impl RowStats {
    pub fn band(&self) -> Option<GradeBand> {
        self.average.map(|avg| GradeBand::classify(avg as f64))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub assignment_id: AssignmentId,
    pub graded_count: usize,
    pub class_size: usize,
    /// Mean raw score to one decimal.
    pub mean_score: Option<f64>,
    pub mean_percentage: Option<i64>,
}

/// Running totals for one assignment column.
#[derive(Debug, Default)]
pub(crate) struct ColumnAccumulator {
    count: usize,
    sum: f64,
}

impl ColumnAccumulator {
    pub(crate) fn push(&mut self, score: f64) {
        self.count += 1;
        self.sum += score;
    }

    pub(crate) fn finish(
        self,
        assignment: &Assignment,
        class_size: usize,
    ) -> Result<ColumnStats, MetricsError> {
        let (mean_score, mean_percentage) = if self.count == 0 {
            (None, None)
        } else {
            let mean = self.sum / self.count as f64;
            (
                Some(round_one_decimal(mean)),
                Some(percentage(mean, assignment.total_points)?),
            )
        };

        Ok(ColumnStats {
            assignment_id: assignment.id,
            graded_count: self.count,
            class_size,
            mean_score,
            mean_percentage,
        })
    }
}

/// One grade per (student, assignment); later grades replace earlier ones.
pub(crate) struct GradeIndex<'a> {
    pub(crate) cells: HashMap<CellKey, &'a Grade>,
    pub(crate) excluded: Vec<MetricsError>,
    pub(crate) replaced: usize,
}

impl<'a> GradeIndex<'a> {
    pub(crate) fn build<F>(grades: &'a [Grade], view: &'static str, mut check: F) -> Self
    where
        F: FnMut(&Grade) -> Result<(), MetricsError>,
    {
        let mut cells: HashMap<CellKey, &'a Grade> = HashMap::with_capacity(grades.len());
        let mut excluded = Vec::new();
        let mut replaced = 0usize;

        for grade in grades {
            if let Err(err) = check(grade) {
                note_excluded(view, &err);
                excluded.push(err);
                continue;
            }
            if let Some(previous) = cells.insert((grade.student_id, grade.assignment_id), grade) {
                replaced += 1;
                tracing::debug!(
                    student_id = grade.student_id,
                    assignment_id = grade.assignment_id,
                    kept = grade.id,
                    dropped = previous.id,
                    "duplicate grade for one student and assignment"
                );
            }
        }

        Self {
            cells,
            excluded,
            replaced,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GradedCell<'a> {
    grade: &'a Grade,
    percent: f64,
}

#[derive(Debug)]
pub struct GradebookMatrix<'a> {
    students: Vec<&'a Student>,
    assignments: Vec<&'a Assignment>,
    cells: HashMap<CellKey, GradedCell<'a>>,
    rows: Vec<RowStats>,
    columns: Vec<ColumnStats>,
    excluded: Vec<MetricsError>,
    replaced: usize,
}

impl<'a> GradebookMatrix<'a> {
    /// Indexes `grades` by (student, assignment) and derives row and column
    /// statistics. Grades with a dangling reference are excluded and
    /// reported by [`GradebookMatrix::excluded`]; a graded assignment with a
    /// non-positive total fails the build.
    pub fn build(
        students: &'a [Student],
        assignments: &'a [Assignment],
        grades: &'a [Grade],
    ) -> Result<Self, MetricsError> {
        let refs = References::new(students, assignments);
        let index = GradeIndex::build(grades, "gradebook", |grade| refs.grade(grade).map(|_| ()));

        // Walk grades in input order so the first failing total is stable.
        let mut cells = HashMap::with_capacity(index.cells.len());
        for grade in grades {
            let key = (grade.student_id, grade.assignment_id);
            let kept = index
                .cells
                .get(&key)
                .is_some_and(|kept| std::ptr::eq(*kept, grade));
            if !kept {
                continue;
            }
            let assignment = refs.grade_assignment(grade)?;
            let percent = ratio_percent(grade.score, assignment.total_points)?;
            cells.insert(key, GradedCell { grade, percent });
        }

        let rows = students
            .iter()
            .map(|student| row_stats(student, assignments, &cells))
            .collect();

        let class_size = students.len();
        let columns = assignments
            .iter()
            .map(|assignment| {
                let mut acc = ColumnAccumulator::default();
                for student in students {
                    if let Some(cell) = cells.get(&(student.id, assignment.id)) {
                        acc.push(cell.grade.score);
                    }
                }
                acc.finish(assignment, class_size)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            students: students.iter().collect(),
            assignments: assignments.iter().collect(),
            cells,
            rows,
            columns,
            excluded: index.excluded,
            replaced: index.replaced,
        })
    }

    pub fn cell(&self, student_id: StudentId, assignment_id: AssignmentId) -> Cell<'a> {
        match self.cells.get(&(student_id, assignment_id)) {
            Some(cell) => Cell::Graded {
                grade: cell.grade,
                percentage: round_half_up(cell.percent) as i64,
            },
            None => Cell::Empty,
        }
    }

    pub fn students(&self) -> &[&'a Student] {
        &self.students
    }

    pub fn assignments(&self) -> &[&'a Assignment] {
        &self.assignments
    }

    /// Row statistics in student order.
    pub fn rows(&self) -> &[RowStats] {
        &self.rows
    }

    /// Column statistics in assignment order.
    pub fn columns(&self) -> &[ColumnStats] {
        &self.columns
    }

    pub fn row(&self, student_id: StudentId) -> Option<&RowStats> {
        self.rows.iter().find(|row| row.student_id == student_id)
    }

    pub fn column(&self, assignment_id: AssignmentId) -> Option<&ColumnStats> {
        self.columns
            .iter()
            .find(|column| column.assignment_id == assignment_id)
    }

    /// Id lookups over the matrix's own students and assignments.
    pub fn references(&self) -> References<'a> {
        References::from_iters(
            self.students.iter().copied(),
            self.assignments.iter().copied(),
        )
    }

    pub fn class_size(&self) -> usize {
        self.students.len()
    }

    pub fn graded_cells(&self) -> usize {
        self.cells.len()
    }

    /// Grades left out because of a referential gap.
    pub fn excluded(&self) -> &[MetricsError] {
        &self.excluded
    }

    /// Grades shadowed by a later grade for the same pair.
    pub fn replaced(&self) -> usize {
        self.replaced
    }

    /// Owned, serializable copy of the table.
    pub fn view(&self) -> GradebookView {
        let rows = self
            .students
            .iter()
            .zip(&self.rows)
            .map(|(student, stats)| GradebookRowView {
                student_id: student.id,
                student_name: student.full_name(),
                cells: self
                    .assignments
                    .iter()
                    .map(|assignment| match self.cell(student.id, assignment.id) {
                        Cell::Empty => None,
                        Cell::Graded { grade, percentage } => Some(CellView {
                            grade_id: grade.id,
                            score: grade.score,
                            percentage,
                        }),
                    })
                    .collect(),
                average: stats.average,
            })
            .collect();

        let columns = self
            .assignments
            .iter()
            .zip(&self.columns)
            .map(|(assignment, stats)| GradebookColumnView {
                assignment_id: assignment.id,
                title: assignment.title.clone(),
                total_points: assignment.total_points,
                stats: stats.clone(),
            })
            .collect();

        GradebookView { columns, rows }
    }
}

fn row_stats(
    student: &Student,
    assignments: &[Assignment],
    cells: &HashMap<CellKey, GradedCell<'_>>,
) -> RowStats {
    let percents: Vec<f64> = assignments
        .iter()
        .filter_map(|assignment| cells.get(&(student.id, assignment.id)))
        .map(|cell| cell.percent)
        .collect();

    let raw_average = (!percents.is_empty()).then(|| average(&percents));
    RowStats {
        student_id: student.id,
        graded_count: percents.len(),
        raw_average,
        average: raw_average.map(|avg| round_half_up(avg) as i64),
    }
}

pub fn build_gradebook_matrix<'a>(
    students: &'a [Student],
    assignments: &'a [Assignment],
    grades: &'a [Grade],
) -> Result<GradebookMatrix<'a>, MetricsError> {
    GradebookMatrix::build(students, assignments, grades)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookView {
    pub columns: Vec<GradebookColumnView>,
    pub rows: Vec<GradebookRowView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookColumnView {
    pub assignment_id: AssignmentId,
    pub title: String,
    pub total_points: f64,
    pub stats: ColumnStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookRowView {
    pub student_id: StudentId,
    pub student_name: String,
    pub cells: Vec<Option<CellView>>,
    pub average: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub grade_id: i64,
    pub score: f64,
    pub percentage: i64,
}
