// Latest-session snapshot of an indicator series
use shared::models::{
    CrossSignal, IndicatorRow, IndicatorSeries, IndicatorSummary, KdjSummary, MacdSummary,
    MovingAverageSummary, OscillatorStatus, PriceSummary, RsiSummary,
};

use crate::indicators::kdj::{K_OVERBOUGHT, K_OVERSOLD};
use crate::indicators::rsi::{RSI_OVERBOUGHT, RSI_OVERSOLD};

/// Projects the last row of `series`; `None` for an empty series.
pub fn summarize(series: &IndicatorSeries) -> Option<IndicatorSummary> {
    series.last().map(summarize_row)
}

pub fn summarize_row(row: &IndicatorRow) -> IndicatorSummary {
    let v = &row.values;
    IndicatorSummary {
        price: PriceSummary {
            close: row.bar.close,
            change: v.price_change,
            change_5d: v.price_change_5d,
        },
        moving_averages: MovingAverageSummary {
            ma5: v.ma5,
            ma10: v.ma10,
            ma20: v.ma20,
            ma60: v.ma60,
            above_ma20: v.above_ma20,
        },
        rsi: RsiSummary {
            value: v.rsi,
            status: OscillatorStatus::classify(v.rsi, RSI_OVERBOUGHT, RSI_OVERSOLD),
        },
        macd: MacdSummary {
            value: v.macd,
            signal: v.macd_signal,
            hist: v.macd_hist,
            signal_text: cross_signal(v.macd_golden_cross, v.macd_death_cross),
        },
        kdj: KdjSummary {
            k: v.k,
            d: v.d,
            j: v.j,
            status: OscillatorStatus::classify(v.k, K_OVERBOUGHT, K_OVERSOLD),
        },
    }
}

// Cross flags hold only on the transition session, so this is a one-day label.
fn cross_signal(golden: Option<bool>, death: Option<bool>) -> CrossSignal {
    if golden == Some(true) {
        CrossSignal::BullishCross
    } else if death == Some(true) {
        CrossSignal::BearishCross
    } else {
        CrossSignal::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::closes;
    use crate::indicators::IndicatorEngine;
    use shared::models::BarSeries;

    fn last_row(values: &[f64]) -> IndicatorRow {
        let series = IndicatorEngine::default().calculate_all(&BarSeries::new(closes(values)));
        series.last().unwrap().clone()
    }

    #[test]
    fn test_summary_projects_last_row() {
        let row = last_row(&[10.0, 10.5, 11.0, 10.8, 11.2, 11.6, 12.0]);
        let summary = summarize_row(&row);
        assert_eq!(summary.price.close, Some(12.0));
        assert_eq!(summary.price.change, row.values.price_change);
        assert_eq!(summary.price.change_5d, row.values.price_change_5d);
        assert_eq!(summary.moving_averages.ma20, row.values.ma20);
        assert_eq!(summary.moving_averages.above_ma20, Some(true));
        assert_eq!(summary.rsi.value, row.values.rsi);
        assert_eq!(summary.kdj.j, row.values.j);
    }

    #[test]
    fn test_status_labels() {
        let mut row = last_row(&[10.0; 6]);
        row.values.rsi = Some(75.0);
        row.values.k = Some(15.0);
        let summary = summarize_row(&row);
        assert_eq!(summary.rsi.status, OscillatorStatus::Overbought);
        assert_eq!(summary.kdj.status, OscillatorStatus::Oversold);

        row.values.rsi = Some(25.0);
        row.values.k = Some(85.0);
        let summary = summarize_row(&row);
        assert_eq!(summary.rsi.status, OscillatorStatus::Oversold);
        assert_eq!(summary.kdj.status, OscillatorStatus::Overbought);

        row.values.rsi = Some(50.0);
        row.values.k = Some(50.0);
        let summary = summarize_row(&row);
        assert_eq!(summary.rsi.status, OscillatorStatus::Neutral);
        assert_eq!(summary.kdj.status, OscillatorStatus::Neutral);
    }

    #[test]
    fn test_macd_signal_text() {
        let mut row = last_row(&[10.0; 6]);
        assert_eq!(summarize_row(&row).macd.signal_text, CrossSignal::Neutral);
        row.values.macd_golden_cross = Some(true);
        assert_eq!(summarize_row(&row).macd.signal_text, CrossSignal::BullishCross);
        row.values.macd_golden_cross = Some(false);
        row.values.macd_death_cross = Some(true);
        assert_eq!(summarize_row(&row).macd.signal_text, CrossSignal::BearishCross);
    }

    #[test]
    fn test_short_series_summary_has_price_only() {
        let series = IndicatorEngine::default().calculate_all(&BarSeries::new(closes(&[10.0, 11.0])));
        let summary = summarize(&series).unwrap();
        assert_eq!(summary.price.close, Some(11.0));
        assert_eq!(summary.price.change, None);
        assert_eq!(summary.rsi.value, None);
        assert_eq!(summary.rsi.status, OscillatorStatus::Neutral);
        assert_eq!(summary.macd.signal_text, CrossSignal::Neutral);
    }

    #[test]
    fn test_empty_series_has_no_summary() {
        assert!(summarize(&IndicatorSeries::default()).is_none());
    }
}
