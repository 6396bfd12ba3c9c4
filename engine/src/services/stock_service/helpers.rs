// Result assembly shared by the stock_service handlers
use shared::models::{BarRecord, DateRange, IndicatorSeries, ResultMetadata, StockResult};

use crate::data::FetchedBars;
use crate::summary::summarize;
use crate::symbols::ResolvedSymbol;

pub const SUCCESS_MESSAGE: &str = "Data retrieved successfully";

/// Builds a successful result. Every numeric field in `data`, `indicators`
/// and `summary` is finite or absent once this returns.
pub fn assemble_result(
    requested_name: &str,
    symbol: &ResolvedSymbol,
    fetched: &FetchedBars,
    indicators: IndicatorSeries,
) -> StockResult {
    let series = &fetched.series;
    let data: Vec<BarRecord> = series
        .bars()
        .iter()
        .map(|bar| BarRecord::from(bar).sanitized())
        .collect();
    let indicators = indicators.sanitized();
    let summary = summarize(&indicators);

    StockResult {
        success: true,
        stock_name: requested_name.to_string(),
        stock_code: Some(symbol.code.clone()),
        message: SUCCESS_MESSAGE.to_string(),
        data: Some(data),
        indicators: Some(indicators.into_rows()),
        summary,
        metadata: Some(ResultMetadata {
            day_count: series.len(),
            date_range: DateRange {
                start: series.first_date(),
                end: series.last_date(),
            },
            provenance: fetched.provenance,
            instrument_class: symbol.class,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::tests::{constant_bars, symbol};
    use crate::indicators::IndicatorEngine;
    use shared::models::{BarSeries, DataProvenance, InstrumentClass};

    fn fetched(count: usize) -> FetchedBars {
        FetchedBars {
            series: BarSeries::new(constant_bars(count, 20.0)),
            provenance: DataProvenance::LocalFile,
        }
    }

    #[test]
    fn test_metadata_reflects_series() {
        let fetched = fetched(12);
        let indicators = IndicatorEngine::default().calculate_all(&fetched.series);
        let result = assemble_result("茅台", &symbol("600519"), &fetched, indicators);

        assert!(result.success);
        assert_eq!(result.stock_name, "茅台");
        assert_eq!(result.stock_code.as_deref(), Some("600519"));
        assert_eq!(result.message, SUCCESS_MESSAGE);
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.day_count, 12);
        assert_eq!(metadata.date_range.start, fetched.series.first_date());
        assert_eq!(metadata.date_range.end, fetched.series.last_date());
        assert_eq!(metadata.provenance, DataProvenance::LocalFile);
        assert_eq!(metadata.instrument_class, InstrumentClass::DomesticEquity);
        assert_eq!(result.data.unwrap().len(), 12);
        assert_eq!(result.indicators.unwrap().len(), 12);
    }

    #[test]
    fn test_non_finite_values_are_blanked() {
        let fetched = fetched(30);
        let mut rows = IndicatorEngine::default()
            .calculate_all(&fetched.series)
            .into_rows();
        rows[3].values.rsi = Some(f64::NAN);
        rows[10].values.macd_hist = Some(f64::INFINITY);
        rows[29].values.k = Some(f64::NEG_INFINITY);
        rows[29].bar.close = Some(f64::NAN);
        let indicators = IndicatorSeries::from_rows(rows);

        let result = assemble_result("x", &symbol("600519"), &fetched, indicators);
        let indicators = result.indicators.unwrap();
        assert!(indicators.iter().all(|row| row.is_finite()));
        assert_eq!(indicators[3].values.rsi, None);
        assert_eq!(indicators[10].values.macd_hist, None);

        let summary = result.summary.unwrap();
        assert_eq!(summary.kdj.k, None);
        assert_eq!(summary.price.close, None);
        assert!(summary.rsi.value.map_or(true, f64::is_finite));
    }

    #[test]
    fn test_short_series_still_assembles() {
        let fetched = fetched(3);
        let indicators = IndicatorEngine::default().calculate_all(&fetched.series);
        let result = assemble_result("x", &symbol("00700"), &fetched, indicators);
        assert!(result.success);
        assert_eq!(result.metadata.unwrap().instrument_class, InstrumentClass::HkEquity);
        assert_eq!(result.summary.unwrap().rsi.value, None);
    }
}
