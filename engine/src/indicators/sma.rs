// Simple moving averages of close with "available data" windows
use super::{require_period, IndicatorCalculator};
use crate::error::EngineError;
use serde_json::Value;
use shared::models::{Bar, IndicatorValues};

/// Trailing mean over `min(window, i + 1)` values at each position.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// MA5/MA10/MA20/MA60 of close, plus "close above MA" flags for the first three.
pub struct MovingAverages {
    name: String,
    periods: [usize; 4],
}

impl MovingAverages {
    pub fn new(periods: [usize; 4]) -> Result<Self, EngineError> {
        for period in periods {
            require_period("MA", period)?;
        }
        Ok(Self {
            name: format!("MA({},{},{},{})", periods[0], periods[1], periods[2], periods[3]),
            periods,
        })
    }
}

impl Default for MovingAverages {
    fn default() -> Self {
        Self {
            name: "MA(5,10,20,60)".to_string(),
            periods: [5, 10, 20, 60],
        }
    }
}

impl IndicatorCalculator for MovingAverages {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "periods": self.periods })
    }

    fn calculate(&self, bars: &[Bar], rows: &mut [IndicatorValues]) {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let [p1, p2, p3, p4] = self.periods.map(|p| rolling_mean(&closes, p));

        for (i, row) in rows.iter_mut().enumerate() {
            let close = closes[i];
            row.ma5 = Some(p1[i]);
            row.ma10 = Some(p2[i]);
            row.ma20 = Some(p3[i]);
            row.ma60 = Some(p4[i]);
            row.above_ma5 = Some(close > p1[i]);
            row.above_ma10 = Some(close > p2[i]);
            row.above_ma20 = Some(close > p3[i]);
        }
    }
}
