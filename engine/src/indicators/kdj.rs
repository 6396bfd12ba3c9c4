// KDJ stochastic oscillator
use super::ema::ewm;
use super::{cross_flags, require_period, IndicatorCalculator};
use crate::error::EngineError;
use serde_json::Value;
use shared::models::{Bar, IndicatorValues};

pub const K_OVERBOUGHT: f64 = 80.0;
pub const K_OVERSOLD: f64 = 20.0;

/// RSV written when the high/low range over the window is zero.
const FLAT_RSV: f64 = 50.0;

pub struct Kdj {
    name: String,
    n: usize,
    m1: usize,
    m2: usize,
}

pub struct KdjLines {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub j: Vec<f64>,
}

impl Kdj {
    pub fn new(n: usize, m1: usize, m2: usize) -> Result<Self, EngineError> {
        require_period("KDJ n", n)?;
        require_period("KDJ m1", m1)?;
        require_period("KDJ m2", m2)?;
        Ok(Self {
            name: format!("KDJ({},{},{})", n, m1, m2),
            n,
            m1,
            m2,
        })
    }

    /// Raw stochastic value over the trailing `n` sessions (fewer at the start).
    pub fn rsv(&self, bars: &[Bar]) -> Vec<f64> {
        (0..bars.len())
            .map(|i| {
                let window = &bars[(i + 1).saturating_sub(self.n)..=i];
                let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
                let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
                let range = highest - lowest;
                if range == 0.0 {
                    FLAT_RSV
                } else {
                    (bars[i].close - lowest) / range * 100.0
                }
            })
            .collect()
    }

    pub fn lines(&self, bars: &[Bar]) -> KdjLines {
        let k = ewm(&self.rsv(bars), 1.0 / self.m1 as f64);
        let d = ewm(&k, 1.0 / self.m2 as f64);
        let j = k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect();
        KdjLines { k, d, j }
    }
}

impl Default for Kdj {
    fn default() -> Self {
        Self {
            name: "KDJ(9,3,3)".to_string(),
            n: 9,
            m1: 3,
            m2: 3,
        }
    }
}

impl IndicatorCalculator for Kdj {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "n": self.n, "m1": self.m1, "m2": self.m2 })
    }

    fn calculate(&self, bars: &[Bar], rows: &mut [IndicatorValues]) {
        let lines = self.lines(bars);
        let crosses = cross_flags(&lines.k, &lines.d);

        for (i, row) in rows.iter_mut().enumerate() {
            let k = lines.k[i];
            row.k = Some(k);
            row.d = Some(lines.d[i]);
            row.j = Some(lines.j[i]);
            row.kdj_golden_cross = Some(crosses[i].0);
            row.kdj_death_cross = Some(crosses[i].1);
            row.k_overbought = Some(k > K_OVERBOUGHT);
            row.k_oversold = Some(k < K_OVERSOLD);
        }
    }
}
