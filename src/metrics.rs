//! Numeric primitives shared by every aggregate view.

use crate::error::MetricsError;

/// Round half up: `floor(x + 0.5)`. Ties go toward positive infinity.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

pub fn round_one_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

pub fn round_two_decimals(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

/// Unrounded `score / total * 100`.
///
/// Fails with [`MetricsError::Division`] when `total` is not strictly
/// positive (NaN included).
pub fn ratio_percent(score: f64, total: f64) -> Result<f64, MetricsError> {
    if !(total > 0.0) {
        return Err(MetricsError::Division { total });
    }
    Ok(score / total * 100.0)
}

/// Whole-number percentage of `score` out of `total`.
pub fn percentage(score: f64, total: f64) -> Result<i64, MetricsError> {
    ratio_percent(score, total).map(|p| round_half_up(p) as i64)
}

/// Arithmetic mean; 0 for an empty slice.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Whole-number share of `count` in `total`; 0 when `total` is 0.
pub fn rate(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    round_half_up(count as f64 / total as f64 * 100.0) as u32
}

/// Four-point scale GPA for a percentage average, two decimals.
pub fn gpa(average_percent: f64) -> f64 {
    round_two_decimals(average_percent / 100.0 * 4.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_of_full_and_empty_scores() {
        for total in [1.0, 10.0, 37.0, 100.0, 250.0] {
            assert_eq!(percentage(total, total), Ok(100));
            assert_eq!(percentage(0.0, total), Ok(0));
        }
        assert_eq!(percentage(17.0, 20.0), Ok(85));
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1.0, 8.0), Ok(13)); // 12.5
        assert_eq!(percentage(1.0, 3.0), Ok(33));
        assert_eq!(percentage(2.0, 3.0), Ok(67));
    }

    #[test]
    fn percentage_rejects_non_positive_totals() {
        assert_eq!(
            percentage(5.0, 0.0),
            Err(MetricsError::Division { total: 0.0 })
        );
        assert_eq!(
            percentage(5.0, -10.0),
            Err(MetricsError::Division { total: -10.0 })
        );
        assert!(ratio_percent(5.0, f64::NAN).is_err());
    }

    #[test]
    fn average_handles_empty_and_order() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[72.0]), 72.0);
        assert_eq!(average(&[90.0, 80.0, 70.0]), 80.0);
        assert_eq!(average(&[70.0, 90.0, 80.0]), 80.0);
    }

    #[test]
    fn rate_with_zero_total_is_zero() {
        assert_eq!(rate(0, 0), 0);
        assert_eq!(rate(5, 0), 0);
        assert_eq!(rate(3, 4), 75);
        assert_eq!(rate(2, 3), 67);
        assert_eq!(rate(4, 4), 100);
    }

    #[test]
    fn gpa_scales_to_four_points() {
        assert_eq!(gpa(100.0), 4.0);
        assert_eq!(gpa(85.0), 3.4);
        assert_eq!(gpa(0.0), 0.0);
    }

    #[test]
    fn one_decimal_rounding() {
        assert_eq!(round_one_decimal(42.25), 42.3);
        assert_eq!(round_one_decimal(17.0), 17.0);
    }
}
