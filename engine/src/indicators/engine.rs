// Runs the indicator set over a bar series
use shared::models::{BarRecord, BarSeries, IndicatorRow, IndicatorSeries, IndicatorValues};

use super::{IndicatorCalculator, Kdj, Macd, MovingAverages, PriceChange, Rsi};

/// Below this many bars no indicator is computed at all.
pub const MIN_BARS: usize = 5;

pub struct IndicatorEngine {
    calculators: Vec<Box<dyn IndicatorCalculator>>,
}

impl IndicatorEngine {
    pub fn new(calculators: Vec<Box<dyn IndicatorCalculator>>) -> Self {
        IndicatorEngine { calculators }
    }

    pub fn calculators(&self) -> impl Iterator<Item = &dyn IndicatorCalculator> {
        self.calculators.iter().map(|c| c.as_ref())
    }

    /// Row-aligned enrichment of `series`. With fewer than `MIN_BARS` bars the
    /// rows carry the bars only.
    pub fn calculate_all(&self, series: &BarSeries) -> IndicatorSeries {
        if series.len() < MIN_BARS {
            tracing::debug!(count = series.len(), min = MIN_BARS, "Not enough bars for indicators");
            return IndicatorSeries::bare(series);
        }

        let bars = series.bars();
        let mut values = vec![IndicatorValues::default(); bars.len()];
        for calculator in &self.calculators {
            tracing::trace!(indicator = calculator.name(), parameters = %calculator.parameters(), "Calculating indicator");
            calculator.calculate(bars, &mut values);
        }

        let rows = bars
            .iter()
            .zip(values)
            .map(|(bar, values)| IndicatorRow {
                bar: BarRecord::from(bar),
                values,
            })
            .collect();
        IndicatorSeries::from_rows(rows)
    }
}

impl Default for IndicatorEngine {
    /// MA(5,10,20,60), RSI(14), MACD(12,26,9), KDJ(9,3,3) and price change.
    fn default() -> Self {
        IndicatorEngine::new(vec![
            Box::new(MovingAverages::default()),
            Box::new(Rsi::default()),
            Box::new(Macd::default()),
            Box::new(Kdj::default()),
            Box::new(PriceChange::default()),
        ])
    }
}
