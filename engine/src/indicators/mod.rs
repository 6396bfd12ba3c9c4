// Technical indicators module
pub mod ema;
pub mod engine;
pub mod kdj;
pub mod macd;
pub mod price_change;
pub mod rsi;
pub mod sma;

pub use engine::{IndicatorEngine, MIN_BARS};
pub use kdj::Kdj;
pub use macd::Macd;
pub use price_change::PriceChange;
pub use rsi::Rsi;
pub use sma::MovingAverages;

use serde_json::Value;
use shared::models::{Bar, IndicatorValues};

use crate::error::EngineError;

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    /// Fills this indicator's fields in `rows`, which is row-aligned with `bars`.
    fn calculate(&self, bars: &[Bar], rows: &mut [IndicatorValues]);
}

pub(crate) fn require_period(indicator: &str, period: usize) -> Result<usize, EngineError> {
    if period == 0 {
        return Err(EngineError::IndicatorError(format!("{} period cannot be 0", indicator)));
    }
    Ok(period)
}

/// Golden/death cross flags per row. A golden cross needs `fast > slow` now and
/// `fast <= slow` on the previous row; the first row never crosses.
pub(crate) fn cross_flags(fast: &[f64], slow: &[f64]) -> Vec<(bool, bool)> {
    (0..fast.len())
        .map(|i| {
            if i == 0 {
                return (false, false);
            }
            let golden = fast[i] > slow[i] && fast[i - 1] <= slow[i - 1];
            let death = fast[i] < slow[i] && fast[i - 1] >= slow[i - 1];
            (golden, death)
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use shared::models::Bar;

    pub fn bar(day: i64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day),
            open: close,
            high,
            low,
            close,
            volume: 1_000,
        }
    }

    pub fn closes(values: &[f64]) -> Vec<Bar> {
        values
            .iter()
            .enumerate()
            .map(|(i, &c)| bar(i as i64, c, c, c))
            .collect()
    }

    pub fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_flags() {
        let fast = [1.0, 2.0, 2.0, 1.0, 1.0, 3.0];
        let slow = [2.0, 1.0, 2.0, 2.0, 1.0, 1.0];
        let flags = cross_flags(&fast, &slow);
        assert_eq!(
            flags,
            vec![(false, false), (true, false), (false, false), (false, true), (false, false), (true, false)]
        );
    }

    #[test]
    fn test_cross_flags_touching_then_crossing() {
        // equal on the previous row still counts as "at or below"
        let flags = cross_flags(&[1.0, 1.0, 0.5], &[1.0, 1.0, 1.0]);
        assert_eq!(flags[2], (false, true));
        let flags = cross_flags(&[1.0, 1.5], &[1.0, 1.0]);
        assert_eq!(flags[1], (true, false));
    }

    #[test]
    fn test_require_period() {
        assert!(matches!(require_period("RSI", 0), Err(EngineError::IndicatorError(_))));
        assert_eq!(require_period("RSI", 14).unwrap(), 14);
    }
}
