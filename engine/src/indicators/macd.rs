// Moving Average Convergence Divergence
use super::ema::{ewm, span_alpha};
use super::{cross_flags, require_period, IndicatorCalculator};
use crate::error::EngineError;
use serde_json::Value;
use shared::models::{Bar, IndicatorValues};

pub struct Macd {
    name: String,
    fast: usize,
    slow: usize,
    signal: usize,
}

/// MACD line, signal line and histogram, row-aligned with the input.
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub hist: Vec<f64>,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, EngineError> {
        require_period("MACD fast", fast)?;
        require_period("MACD slow", slow)?;
        require_period("MACD signal", signal)?;
        if fast >= slow {
            return Err(EngineError::IndicatorError(format!(
                "MACD fast span ({}) must be shorter than slow span ({})",
                fast, slow
            )));
        }
        Ok(Self {
            name: format!("MACD({},{},{})", fast, slow, signal),
            fast,
            slow,
            signal,
        })
    }

    pub fn lines(&self, closes: &[f64]) -> MacdLines {
        let fast = ewm(closes, span_alpha(self.fast));
        let slow = ewm(closes, span_alpha(self.slow));
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ewm(&macd, span_alpha(self.signal));
        let hist = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
        MacdLines { macd, signal, hist }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            name: "MACD(12,26,9)".to_string(),
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl IndicatorCalculator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "fast": self.fast, "slow": self.slow, "signal": self.signal })
    }

    fn calculate(&self, bars: &[Bar], rows: &mut [IndicatorValues]) {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let lines = self.lines(&closes);
        let crosses = cross_flags(&lines.macd, &lines.signal);

        for (i, row) in rows.iter_mut().enumerate() {
            row.macd = Some(lines.macd[i]);
            row.macd_signal = Some(lines.signal[i]);
            row.macd_hist = Some(lines.hist[i]);
            row.macd_golden_cross = Some(crosses[i].0);
            row.macd_death_cross = Some(crosses[i].1);
        }
    }
}
