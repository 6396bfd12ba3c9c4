use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::finite;

/// One daily trading session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Bars ordered by strictly increasing date.
///
/// Construction always normalizes the input, so downstream code can rely on
/// the ordering without re-checking it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Sorts by date and drops duplicate sessions, keeping the first occurrence.
    pub fn new(mut bars: Vec<Bar>) -> Self {
        // stable sort keeps the first occurrence of a duplicated date in front
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        BarSeries { bars }
    }

    /// Keeps only the most recent `count` sessions.
    pub fn tail(self, count: usize) -> Self {
        let skip = self.bars.len().saturating_sub(count);
        BarSeries {
            bars: self.bars.into_iter().skip(skip).collect(),
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Instrument class derived from the lexical shape of an exchange code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentClass {
    DomesticEquity,
    HkEquity,
    OtherEquity,
    Index,
}

impl InstrumentClass {
    /// Six ASCII digits is a domestic equity, five characters led by `0` is a
    /// Hong Kong equity, anything else is treated as an overseas equity.
    /// Never yields `Index`; indices are only known from the symbol table.
    pub fn from_code(code: &str) -> Self {
        if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
            InstrumentClass::DomesticEquity
        } else if code.chars().count() == 5 && code.starts_with('0') {
            InstrumentClass::HkEquity
        } else {
            InstrumentClass::OtherEquity
        }
    }
}

/// Listing bucket used by stock lists and keyword search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    AShare,
    HkShare,
    UsShare,
}

impl ListingType {
    pub fn from_code(code: &str) -> Self {
        match InstrumentClass::from_code(code) {
            InstrumentClass::DomesticEquity | InstrumentClass::Index => ListingType::AShare,
            InstrumentClass::HkEquity => ListingType::HkShare,
            InstrumentClass::OtherEquity => ListingType::UsShare,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::AShare => "a_share",
            ListingType::HkShare => "hk_share",
            ListingType::UsShare => "us_share",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a_share" => Some(ListingType::AShare),
            "hk_share" => Some(ListingType::HkShare),
            "us_share" => Some(ListingType::UsShare),
            _ => None,
        }
    }
}

/// Where a bar series came from. Synthetic data is always tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataProvenance {
    Live,
    LocalFile,
    Synthetic,
}

/// OHLCV fields as they appear at the output boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: u64,
}

impl From<&Bar> for BarRecord {
    fn from(bar: &Bar) -> Self {
        BarRecord {
            date: bar.date,
            open: Some(bar.open),
            high: Some(bar.high),
            low: Some(bar.low),
            close: Some(bar.close),
            volume: bar.volume,
        }
    }
}

impl BarRecord {
    pub fn sanitized(self) -> Self {
        BarRecord {
            open: self.open.and_then(finite),
            high: self.high.and_then(finite),
            low: self.low.and_then(finite),
            close: self.close.and_then(finite),
            ..self
        }
    }
}

/// Per-session indicator fields. `None` means "no valid value".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValues {
    #[serde(rename = "MA5")]
    pub ma5: Option<f64>,
    #[serde(rename = "MA10")]
    pub ma10: Option<f64>,
    #[serde(rename = "MA20")]
    pub ma20: Option<f64>,
    #[serde(rename = "MA60")]
    pub ma60: Option<f64>,
    #[serde(rename = "above_MA5")]
    pub above_ma5: Option<bool>,
    #[serde(rename = "above_MA10")]
    pub above_ma10: Option<bool>,
    #[serde(rename = "above_MA20")]
    pub above_ma20: Option<bool>,

    #[serde(rename = "RSI")]
    pub rsi: Option<f64>,
    #[serde(rename = "RSI_overbought")]
    pub rsi_overbought: Option<bool>,
    #[serde(rename = "RSI_oversold")]
    pub rsi_oversold: Option<bool>,

    #[serde(rename = "MACD")]
    pub macd: Option<f64>,
    #[serde(rename = "MACD_signal")]
    pub macd_signal: Option<f64>,
    #[serde(rename = "MACD_hist")]
    pub macd_hist: Option<f64>,
    #[serde(rename = "MACD_golden_cross")]
    pub macd_golden_cross: Option<bool>,
    #[serde(rename = "MACD_death_cross")]
    pub macd_death_cross: Option<bool>,

    #[serde(rename = "K")]
    pub k: Option<f64>,
    #[serde(rename = "D")]
    pub d: Option<f64>,
    #[serde(rename = "J")]
    pub j: Option<f64>,
    #[serde(rename = "KDJ_golden_cross")]
    pub kdj_golden_cross: Option<bool>,
    #[serde(rename = "KDJ_death_cross")]
    pub kdj_death_cross: Option<bool>,
    #[serde(rename = "K_overbought")]
    pub k_overbought: Option<bool>,
    #[serde(rename = "K_oversold")]
    pub k_oversold: Option<bool>,

    pub price_change: Option<f64>,
    pub price_change_5d: Option<f64>,
}

impl IndicatorValues {
    /// Replaces every non-finite number with `None`.
    pub fn sanitized(self) -> Self {
        IndicatorValues {
            ma5: self.ma5.and_then(finite),
            ma10: self.ma10.and_then(finite),
            ma20: self.ma20.and_then(finite),
            ma60: self.ma60.and_then(finite),
            rsi: self.rsi.and_then(finite),
            macd: self.macd.and_then(finite),
            macd_signal: self.macd_signal.and_then(finite),
            macd_hist: self.macd_hist.and_then(finite),
            k: self.k.and_then(finite),
            d: self.d.and_then(finite),
            j: self.j.and_then(finite),
            price_change: self.price_change.and_then(finite),
            price_change_5d: self.price_change_5d.and_then(finite),
            ..self
        }
    }

    /// Every numeric field, in declaration order.
    pub fn numbers(&self) -> [Option<f64>; 13] {
        [
            self.ma5,
            self.ma10,
            self.ma20,
            self.ma60,
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.k,
            self.d,
            self.j,
            self.price_change,
            self.price_change_5d,
        ]
    }
}

/// One enriched session: the original bar plus its indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub bar: BarRecord,
    #[serde(flatten)]
    pub values: IndicatorValues,
}

impl IndicatorRow {
    pub fn sanitized(self) -> Self {
        IndicatorRow {
            bar: self.bar.sanitized(),
            values: self.values.sanitized(),
        }
    }

    /// True when no number in the row is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        let bar = [self.bar.open, self.bar.high, self.bar.low, self.bar.close];
        bar.iter()
            .chain(self.values.numbers().iter())
            .flatten()
            .all(|v| v.is_finite())
    }
}

/// Row-aligned indicator output for a `BarSeries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSeries {
    rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    pub fn from_rows(rows: Vec<IndicatorRow>) -> Self {
        IndicatorSeries { rows }
    }

    /// Rows carrying only the bar fields, every indicator absent.
    pub fn bare(series: &BarSeries) -> Self {
        IndicatorSeries {
            rows: series
                .bars()
                .iter()
                .map(|bar| IndicatorRow {
                    bar: BarRecord::from(bar),
                    values: IndicatorValues::default(),
                })
                .collect(),
        }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<IndicatorRow> {
        self.rows
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sanitized(self) -> Self {
        IndicatorSeries {
            rows: self.rows.into_iter().map(IndicatorRow::sanitized).collect(),
        }
    }
}

/// Overbought/oversold reading of an oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorStatus {
    Overbought,
    Oversold,
    Neutral,
}

impl OscillatorStatus {
    /// Strict comparisons on both thresholds; a missing value is neutral.
    pub fn classify(value: Option<f64>, upper: f64, lower: f64) -> Self {
        match value {
            Some(v) if v > upper => OscillatorStatus::Overbought,
            Some(v) if v < lower => OscillatorStatus::Oversold,
            _ => OscillatorStatus::Neutral,
        }
    }
}

/// Cross event on the latest session only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossSignal {
    #[serde(rename = "bullish cross")]
    BullishCross,
    #[serde(rename = "bearish cross")]
    BearishCross,
    #[serde(rename = "neutral")]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub close: Option<f64>,
    pub change: Option<f64>,
    pub change_5d: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSummary {
    #[serde(rename = "MA5")]
    pub ma5: Option<f64>,
    #[serde(rename = "MA10")]
    pub ma10: Option<f64>,
    #[serde(rename = "MA20")]
    pub ma20: Option<f64>,
    #[serde(rename = "MA60")]
    pub ma60: Option<f64>,
    #[serde(rename = "aboveMA20")]
    pub above_ma20: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiSummary {
    pub value: Option<f64>,
    pub status: OscillatorStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdSummary {
    pub value: Option<f64>,
    pub signal: Option<f64>,
    pub hist: Option<f64>,
    pub signal_text: CrossSignal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KdjSummary {
    #[serde(rename = "K")]
    pub k: Option<f64>,
    #[serde(rename = "D")]
    pub d: Option<f64>,
    #[serde(rename = "J")]
    pub j: Option<f64>,
    pub status: OscillatorStatus,
}

/// Latest-session snapshot of an `IndicatorSeries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSummary {
    pub price: PriceSummary,
    pub moving_averages: MovingAverageSummary,
    pub rsi: RsiSummary,
    pub macd: MacdSummary,
    pub kdj: KdjSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub day_count: usize,
    pub date_range: DateRange,
    pub provenance: DataProvenance,
    pub instrument_class: InstrumentClass,
}

/// Outcome of one lookup. Failures carry only the name and a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResult {
    pub success: bool,
    pub stock_name: String,
    pub stock_code: Option<String>,
    pub message: String,
    pub data: Option<Vec<BarRecord>>,
    pub indicators: Option<Vec<IndicatorRow>>,
    pub summary: Option<IndicatorSummary>,
    pub metadata: Option<ResultMetadata>,
}

impl StockResult {
    pub fn failure(stock_name: &str, message: impl Into<String>) -> Self {
        StockResult {
            success: false,
            stock_name: stock_name.to_string(),
            stock_code: None,
            message: message.into(),
            data: None,
            indicators: None,
            summary: None,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleSummary {
    pub rsi: Option<f64>,
    pub rsi_status: Option<OscillatorStatus>,
    pub macd_signal: Option<CrossSignal>,
    pub above_ma20: Option<bool>,
}

/// Compact view of a `StockResult` for quick checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleStockView {
    pub success: bool,
    pub stock_name: String,
    pub stock_code: Option<String>,
    pub message: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub summary: Option<SimpleSummary>,
    pub data_points: usize,
}

impl From<&StockResult> for SimpleStockView {
    fn from(result: &StockResult) -> Self {
        let summary = result.summary.as_ref();
        SimpleStockView {
            success: result.success,
            stock_name: result.stock_name.clone(),
            stock_code: result.stock_code.clone(),
            message: result.message.clone(),
            price: summary.and_then(|s| s.price.close),
            change: summary.and_then(|s| s.price.change),
            summary: summary.map(|s| SimpleSummary {
                rsi: s.rsi.value,
                rsi_status: Some(s.rsi.status),
                macd_signal: Some(s.macd.signal_text),
                above_ma20: s.moving_averages.above_ma20,
            }),
            data_points: result.metadata.as_ref().map_or(0, |m| m.day_count),
        }
    }
}

/// Entry of a stock list or keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockListing {
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub display_name: String,
}

impl StockListing {
    pub fn new(name: &str, code: &str) -> Self {
        StockListing {
            name: name.to_string(),
            code: code.to_string(),
            listing_type: ListingType::from_code(code),
            display_name: format!("{} ({})", name, code),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCounts {
    pub a_share: usize,
    pub hk_share: usize,
    pub us_share: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockList {
    pub success: bool,
    pub message: String,
    pub data: Vec<StockListing>,
    pub count: usize,
    pub types: ListingCounts,
}

impl StockList {
    pub fn from_listings(data: Vec<StockListing>) -> Self {
        let mut types = ListingCounts::default();
        for listing in &data {
            match listing.listing_type {
                ListingType::AShare => types.a_share += 1,
                ListingType::HkShare => types.hk_share += 1,
                ListingType::UsShare => types.us_share += 1,
            }
        }
        StockList {
            success: true,
            message: format!("Found {} stocks", data.len()),
            count: data.len(),
            data,
            types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_bar_series_sorts_and_dedups() {
        let series = BarSeries::new(vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0), bar(1, 9.0)]);
        let closes = series.closes();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn test_bar_series_tail_keeps_latest() {
        let series = BarSeries::new((1..=10).map(|d| bar(d, d as f64)).collect()).tail(3);
        assert_eq!(series.closes(), vec![8.0, 9.0, 10.0]);
        let short = BarSeries::new(vec![bar(1, 1.0)]).tail(5);
        assert_eq!(short.len(), 1);
    }

    #[test]
    fn test_instrument_class_from_code_shape() {
        assert_eq!(InstrumentClass::from_code("600519"), InstrumentClass::DomesticEquity);
        assert_eq!(InstrumentClass::from_code("000001"), InstrumentClass::DomesticEquity);
        assert_eq!(InstrumentClass::from_code("00700"), InstrumentClass::HkEquity);
        assert_eq!(InstrumentClass::from_code("09988"), InstrumentClass::HkEquity);
        assert_eq!(InstrumentClass::from_code("AAPL"), InstrumentClass::OtherEquity);
        assert_eq!(InstrumentClass::from_code("12345"), InstrumentClass::OtherEquity);
        assert_eq!(InstrumentClass::from_code("60051a"), InstrumentClass::OtherEquity);
    }

    #[test]
    fn test_oscillator_status_thresholds_are_strict() {
        assert_eq!(OscillatorStatus::classify(Some(70.0), 70.0, 30.0), OscillatorStatus::Neutral);
        assert_eq!(OscillatorStatus::classify(Some(70.1), 70.0, 30.0), OscillatorStatus::Overbought);
        assert_eq!(OscillatorStatus::classify(Some(29.9), 70.0, 30.0), OscillatorStatus::Oversold);
        assert_eq!(OscillatorStatus::classify(None, 70.0, 30.0), OscillatorStatus::Neutral);
    }

    #[test]
    fn test_row_sanitize_clears_non_finite() {
        let mut row = IndicatorSeries::bare(&BarSeries::new(vec![bar(1, 10.0)])).into_rows().remove(0);
        row.bar.high = Some(f64::INFINITY);
        row.values.rsi = Some(f64::NAN);
        row.values.k = Some(f64::NEG_INFINITY);
        row.values.ma5 = Some(10.0);
        assert!(!row.is_finite());

        let clean = row.sanitized();
        assert!(clean.is_finite());
        assert_eq!(clean.bar.high, None);
        assert_eq!(clean.values.rsi, None);
        assert_eq!(clean.values.k, None);
        assert_eq!(clean.values.ma5, Some(10.0));
    }

    #[test]
    fn test_row_serializes_flat_with_column_names() {
        let mut row = IndicatorSeries::bare(&BarSeries::new(vec![bar(5, 10.0)])).into_rows().remove(0);
        row.values.ma5 = Some(10.0);
        row.values.macd_golden_cross = Some(false);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["date"], "2024-01-05");
        assert_eq!(json["close"], 10.0);
        assert_eq!(json["MA5"], 10.0);
        assert_eq!(json["MACD_golden_cross"], false);
        assert!(json["RSI"].is_null());
    }

    #[test]
    fn test_stock_list_counts_types() {
        let list = StockList::from_listings(vec![
            StockListing::new("贵州茅台", "600519"),
            StockListing::new("腾讯", "00700"),
            StockListing::new("苹果", "AAPL"),
            StockListing::new("微软", "MSFT"),
        ]);
        assert_eq!(list.count, 4);
        assert_eq!(list.types, ListingCounts { a_share: 1, hk_share: 1, us_share: 2 });
        assert_eq!(list.data[0].display_name, "贵州茅台 (600519)");
    }
}
