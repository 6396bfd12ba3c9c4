// Numeric helpers used by the indicator engine and the output sanitizer.

/// `Some(value)` when the value is a finite number.
pub fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Percentage change from `previous` to `current`, absent when undefined.
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    finite((current / previous - 1.0) * 100.0)
}

/// Rounds to `decimals` places, used for generated prices.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(100.0, 110.0).map(|v| round_to(v, 6)), Some(10.0));
        assert_eq!(pct_change(100.0, 100.0), Some(0.0));
        assert_eq!(pct_change(0.0, 5.0), None);
        assert_eq!(pct_change(0.0, 0.0), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(99.995, 0), 100.0);
    }
}
