use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GradeBand {
    A,
    B,
    C,
    D,
    F,
}

/// Display status attached to each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BandStatus {
    Success,
    Primary,
    Warning,
    WarningLow,
    Error,
}

impl BandStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BandStatus::Success => "success",
            BandStatus::Primary => "primary",
            BandStatus::Warning => "warning",
            BandStatus::WarningLow => "warning-low",
            BandStatus::Error => "error",
        }
    }
}

impl GradeBand {
    /// Highest band first.
    pub const ALL: [GradeBand; 5] = [
        GradeBand::A,
        GradeBand::B,
        GradeBand::C,
        GradeBand::D,
        GradeBand::F,
    ];

    /// Inclusive lower bounds, checked top-down. Total over all reals; NaN
    /// lands in F.
    pub fn classify(percent: f64) -> Self {
        if percent >= 90.0 {
            GradeBand::A
        } else if percent >= 80.0 {
            GradeBand::B
        } else if percent >= 70.0 {
            GradeBand::C
        } else if percent >= 60.0 {
            GradeBand::D
        } else {
            GradeBand::F
        }
    }

    pub fn status(self) -> BandStatus {
        match self {
            GradeBand::A => BandStatus::Success,
            GradeBand::B => BandStatus::Primary,
            GradeBand::C => BandStatus::Warning,
            GradeBand::D => BandStatus::WarningLow,
            GradeBand::F => BandStatus::Error,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            GradeBand::A => "A",
            GradeBand::B => "B",
            GradeBand::C => "C",
            GradeBand::D => "D",
            GradeBand::F => "F",
        }
    }
}

impl fmt::Display for GradeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

pub fn classify(percent: f64) -> GradeBand {
    GradeBand::classify(percent)
}

/// Attendance badge: 90% and above is good standing.
pub fn attendance_status(rate: u32) -> BandStatus {
    if rate >= 90 {
        BandStatus::Success
    } else {
        BandStatus::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_the_higher_band() {
        assert_eq!(classify(90.0), GradeBand::A);
        assert_eq!(classify(89.0), GradeBand::B);
        assert_eq!(classify(80.0), GradeBand::B);
        assert_eq!(classify(79.0), GradeBand::C);
        assert_eq!(classify(70.0), GradeBand::C);
        assert_eq!(classify(69.9), GradeBand::D);
        assert_eq!(classify(60.0), GradeBand::D);
        assert_eq!(classify(59.99), GradeBand::F);
        assert_eq!(classify(0.0), GradeBand::F);
    }

    #[test]
    fn out_of_range_values_use_the_same_rule() {
        assert_eq!(classify(140.0), GradeBand::A);
        assert_eq!(classify(-12.0), GradeBand::F);
        assert_eq!(classify(f64::NAN), GradeBand::F);
    }

    #[test]
    fn statuses_follow_band_order() {
        let statuses: Vec<&str> = GradeBand::ALL
            .iter()
            .map(|band| band.status().as_str())
            .collect();
        assert_eq!(
            statuses,
            vec!["success", "primary", "warning", "warning-low", "error"]
        );
    }

    #[test]
    fn attendance_badge_threshold() {
        assert_eq!(attendance_status(90), BandStatus::Success);
        assert_eq!(attendance_status(89), BandStatus::Warning);
    }
}
