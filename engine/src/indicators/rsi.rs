// Relative Strength Index (RSI) indicator implementation
use super::sma::rolling_mean;
use super::{require_period, IndicatorCalculator};
use crate::error::EngineError;
use serde_json::Value;
use shared::models::{Bar, IndicatorValues};

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

/// Relative strength used when a window has gains but no losses.
const NO_LOSS_RS: f64 = 100.0;

pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        let period = require_period("RSI", period)?;
        Ok(Self {
            name: format!("RSI({})", period),
            period,
        })
    }

    /// Simple-average RSI. Gains and losses are averaged over the trailing
    /// `period` sessions (fewer at the start, the first session counting as
    /// no change). A window with gains but no losses takes RS = 100
    /// (RSI ≈ 99.01); a window with neither gains nor losses is 100.
    pub fn values(&self, closes: &[f64]) -> Vec<f64> {
        let mut gains = Vec::with_capacity(closes.len());
        let mut losses = Vec::with_capacity(closes.len());
        for i in 0..closes.len() {
            let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        avg_gain
            .iter()
            .zip(avg_loss.iter())
            .map(|(&gain, &loss)| {
                if gain == 0.0 && loss == 0.0 {
                    return 100.0; // flat window
                }
                let rs = if loss == 0.0 { NO_LOSS_RS } else { gain / loss };
                100.0 - (100.0 / (1.0 + rs))
            })
            .collect()
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            name: "RSI(14)".to_string(),
            period: 14,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period, "overbought": RSI_OVERBOUGHT, "oversold": RSI_OVERSOLD })
    }

    fn calculate(&self, bars: &[Bar], rows: &mut [IndicatorValues]) {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        for (row, rsi) in rows.iter_mut().zip(self.values(&closes)) {
            row.rsi = Some(rsi);
            row.rsi_overbought = Some(rsi > RSI_OVERBOUGHT);
            row.rsi_oversold = Some(rsi < RSI_OVERSOLD);
        }
    }
}
