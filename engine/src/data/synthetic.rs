// Generated bars for offline use. Always tagged as synthetic.
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::models::{Bar, BarSeries, DataProvenance};
use shared::utils::round_to;

use super::source::{BarSource, FetchedBars};
use crate::error::EngineError;
use crate::symbols::ResolvedSymbol;

#[derive(Debug, Clone, Default)]
pub struct SyntheticBarSource {
    seed: Option<u64>,
    end_date: Option<NaiveDate>,
}

impl SyntheticBarSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same seed and end date always produce the same series.
    pub fn seeded(seed: u64, end_date: NaiveDate) -> Self {
        SyntheticBarSource {
            seed: Some(seed),
            end_date: Some(end_date),
        }
    }

    /// One bar per calendar day ending at `end_date`, around a single base price.
    pub fn generate(&self, days: usize) -> Vec<Bar> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let end_date = self.end_date.unwrap_or_else(|| Local::now().date_naive());
        let base_price: f64 = 100.0 + rng.gen_range(-50.0..50.0);

        (0..days)
            .map(|i| {
                let date = end_date - Duration::days((days - i - 1) as i64);
                let open = base_price + rng.gen_range(-2.0..2.0);
                let close = open + rng.gen_range(-5.0..5.0);
                let high = open.max(close) + rng.gen_range(0.0..3.0);
                let low = open.min(close) - rng.gen_range(0.0..3.0);
                Bar {
                    date,
                    open: round_to(open, 2),
                    high: round_to(high, 2),
                    low: round_to(low, 2),
                    close: round_to(close, 2),
                    volume: rng.gen_range(1_000_000..=10_000_000),
                }
            })
            .collect()
    }
}

#[async_trait]
impl BarSource for SyntheticBarSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn fetch(&self, symbol: &ResolvedSymbol, days: usize) -> Result<FetchedBars, EngineError> {
        tracing::warn!(code = %symbol.code, days, "Serving synthetic bars");
        Ok(FetchedBars {
            series: BarSeries::new(self.generate(days)),
            provenance: DataProvenance::Synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::tests::symbol;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_generate_shape() {
        let bars = SyntheticBarSource::seeded(42, end()).generate(30);
        assert_eq!(bars.len(), 30);
        assert_eq!(bars.last().unwrap().date, end());
        assert_eq!(bars[0].date, end() - Duration::days(29));
        for bar in &bars {
            assert!(bar.high >= bar.open.max(bar.close));
            assert!(bar.low <= bar.open.min(bar.close));
            assert!(bar.low > 0.0);
            assert!((1_000_000..=10_000_000).contains(&bar.volume));
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = SyntheticBarSource::seeded(7, end()).generate(20);
        let b = SyntheticBarSource::seeded(7, end()).generate(20);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_fetch_is_tagged_synthetic() {
        let fetched = SyntheticBarSource::seeded(1, end()).fetch(&symbol("AAPL"), 12).await.unwrap();
        assert_eq!(fetched.provenance, DataProvenance::Synthetic);
        assert_eq!(fetched.series.len(), 12);
    }
}
