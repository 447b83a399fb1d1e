//! Attendance tallies per student, per day, and across the class.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::lookup::{note_excluded, References};
use crate::metrics::rate;
use crate::models::{AttendanceRecord, AttendanceStatus, StudentId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceTally {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

impl AttendanceTally {
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.present + self.absent + self.late
    }

    /// Late does not count as present.
    pub fn present_rate(&self) -> u32 {
        rate(self.present, self.total())
    }
}

impl<'a> FromIterator<&'a AttendanceRecord> for AttendanceTally {
    fn from_iter<I: IntoIterator<Item = &'a AttendanceRecord>>(iter: I) -> Self {
        let mut tally = AttendanceTally::default();
        for record in iter {
            tally.record(record.status);
        }
        tally
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub tally: AttendanceTally,
    pub present_rate: u32,
}

impl DaySummary {
    fn new(date: NaiveDate, tally: AttendanceTally) -> Self {
        Self {
            date,
            tally,
            present_rate: tally.present_rate(),
        }
    }
}

/// Records whose student resolves through `refs`; the rest are logged and
/// dropped.
pub fn attributable<'r>(
    refs: &References<'_>,
    records: &'r [AttendanceRecord],
) -> Vec<&'r AttendanceRecord> {
    records
        .iter()
        .filter(|record| match refs.attendance_student(record) {
            Ok(_) => true,
            Err(err) => {
                note_excluded("attendance", &err);
                false
            }
        })
        .collect()
}

pub fn by_student(records: &[&AttendanceRecord]) -> HashMap<StudentId, AttendanceTally> {
    let mut tallies: HashMap<StudentId, AttendanceTally> = HashMap::new();
    for record in records {
        tallies.entry(record.student_id).or_default().record(record.status);
    }
    tallies
}

pub fn day_summary(records: &[&AttendanceRecord], date: NaiveDate) -> DaySummary {
    let tally = records
        .iter()
        .copied()
        .filter(|record| record.date == date)
        .collect();
    DaySummary::new(date, tally)
}

/// One summary per recorded date, oldest first.
pub fn calendar(records: &[&AttendanceRecord]) -> Vec<DaySummary> {
    let mut days: BTreeMap<NaiveDate, AttendanceTally> = BTreeMap::new();
    for record in records {
        days.entry(record.date).or_default().record(record.status);
    }
    days.into_iter()
        .map(|(date, tally)| DaySummary::new(date, tally))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{attendance, day, student};
    use crate::models::AttendanceStatus::{Absent, Late, Present};

    fn sample() -> Vec<AttendanceRecord> {
        vec![
            attendance(1, 1, 2, Present),
            attendance(2, 2, 2, Absent),
            attendance(3, 3, 2, Late),
            attendance(4, 1, 3, Present),
            attendance(5, 2, 3, Present),
            attendance(6, 9, 3, Present),
        ]
    }

    #[test]
    fn late_is_not_present() {
        let records = sample();
        let tally: AttendanceTally = records.iter().take(3).collect();
        assert_eq!(
            tally,
            AttendanceTally {
                present: 1,
                absent: 1,
                late: 1
            }
        );
        assert_eq!(tally.present_rate(), 33);
    }

    #[test]
    fn empty_tally_rate_is_zero() {
        assert_eq!(AttendanceTally::default().present_rate(), 0);
    }

    #[test]
    fn drops_records_for_unknown_students() {
        let students = vec![
            student(1, "Ada", "Park"),
            student(2, "Ben", "Okafor"),
            student(3, "Cleo", "Marsh"),
        ];
        let records = sample();
        let refs = References::new(&students, &[]);
        let kept = attributable(&refs, &records);
        assert_eq!(kept.len(), 5);
        assert!(kept.iter().all(|r| r.student_id != 9));

        let per_student = by_student(&kept);
        assert_eq!(per_student[&1].present, 2);
        assert_eq!(per_student[&2].total(), 2);
        assert!(!per_student.contains_key(&9));
    }

    #[test]
    fn calendar_is_ordered_by_date() {
        let records = sample();
        let all: Vec<&AttendanceRecord> = records.iter().collect();
        let days = calendar(&all);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, day(2));
        assert_eq!(days[1].tally.present, 3);
        assert_eq!(days[1].present_rate, 100);

        let quiet = day_summary(&all, day(9));
        assert_eq!(quiet.tally.total(), 0);
        assert_eq!(quiet.present_rate, 0);
    }
}
