// Session-over-session and 5-session percentage change of close
use super::{require_period, IndicatorCalculator};
use crate::error::EngineError;
use serde_json::Value;
use shared::models::{Bar, IndicatorValues};
use shared::utils::pct_change;

pub struct PriceChange {
    name: String,
    long_period: usize,
}

impl PriceChange {
    pub fn new(long_period: usize) -> Result<Self, EngineError> {
        let long_period = require_period("price change", long_period)?;
        Ok(Self {
            name: format!("PriceChange(1,{})", long_period),
            long_period,
        })
    }

    /// Percentage change against the close `lag` sessions back; absent for
    /// positions without that much history.
    pub fn changes(closes: &[f64], lag: usize) -> Vec<Option<f64>> {
        (0..closes.len())
            .map(|i| {
                if i < lag {
                    None
                } else {
                    pct_change(closes[i - lag], closes[i])
                }
            })
            .collect()
    }
}

impl Default for PriceChange {
    fn default() -> Self {
        Self {
            name: "PriceChange(1,5)".to_string(),
            long_period: 5,
        }
    }
}

impl IndicatorCalculator for PriceChange {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "periods": [1, self.long_period] })
    }

    fn calculate(&self, bars: &[Bar], rows: &mut [IndicatorValues]) {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let short = Self::changes(&closes, 1);
        let long = Self::changes(&closes, self.long_period);
        for (i, row) in rows.iter_mut().enumerate() {
            row.price_change = short[i];
            row.price_change_5d = long[i];
        }
    }
}
