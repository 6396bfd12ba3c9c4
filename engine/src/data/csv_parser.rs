// Local CSV bar files, one file per code: <dir>/<code>.csv
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use shared::models::{Bar, BarSeries, DataProvenance};

use super::source::{BarSource, FetchedBars};
use crate::error::EngineError;
use crate::symbols::ResolvedSymbol;

pub struct BarCsvParser;

impl BarCsvParser {
    // CSV Header: date,open,high,low,close,volume
    // Example Row: 2024-01-02,1715.00,1718.19,1678.10,1685.01,32156
    pub fn parse_bars(content: &str) -> Result<Vec<Bar>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr.headers()?.clone();
        let mut bars = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result.map_err(|e| anyhow!("Error reading CSV record at line {}: {}", line, e))?;

            let date_str = Self::required(&record, &headers, "date", line)?;
            let date = Self::parse_date(date_str)
                .map_err(|e| anyhow!("Error parsing 'date' at line {}: {}", line, e))?;

            let open = Self::parse_price(&record, &headers, "open", line)?;
            let high = Self::parse_price(&record, &headers, "high", line)?;
            let low = Self::parse_price(&record, &headers, "low", line)?;
            let close = Self::parse_price(&record, &headers, "close", line)?;

            let volume_str = Self::required(&record, &headers, "volume", line)?;
            let volume = Self::parse_volume(volume_str)
                .map_err(|e| anyhow!("Error parsing 'volume' at line {}: {}", line, e))?;

            bars.push(Bar { date, open, high, low, close, volume });
        }
        Ok(bars)
    }

    // Accepts 2024-01-02 and 20240102
    fn parse_date(s: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
            .map_err(|e| anyhow!("Failed to parse date '{}': {}", s, e))
    }

    fn parse_price(record: &StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<f64> {
        let raw = Self::required(record, headers, name, line)?;
        raw.parse::<f64>()
            .map_err(|e| anyhow!("Error parsing '{}' at line {}: '{}' ({})", name, line, raw, e))
    }

    // Volume is sometimes exported with a fractional part
    fn parse_volume(s: &str) -> Result<u64> {
        if let Ok(v) = s.parse::<u64>() {
            return Ok(v);
        }
        let v = s.parse::<f64>().map_err(|e| anyhow!("Failed to parse volume '{}': {}", s, e))?;
        if !v.is_finite() || v < 0.0 {
            return Err(anyhow!("Volume out of range: '{}'", s));
        }
        Ok(v.round() as u64)
    }

    fn required<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<&'a str> {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
            .and_then(|pos| record.get(pos))
            .ok_or_else(|| anyhow!("Missing '{}' field in CSV record at line {}", name, line))
    }
}

/// Reads bars from `<data_dir>/<code>.csv`.
pub struct CsvBarSource {
    data_dir: PathBuf,
}

impl CsvBarSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        CsvBarSource { data_dir: data_dir.into() }
    }

    fn path_for(&self, code: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", code))
    }
}

#[async_trait]
impl BarSource for CsvBarSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch(&self, symbol: &ResolvedSymbol, days: usize) -> Result<FetchedBars, EngineError> {
        let path = self.path_for(&symbol.code);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            EngineError::unavailable(&symbol.code, format!("cannot read '{}': {}", path.display(), e))
        })?;
        let bars = BarCsvParser::parse_bars(&content)
            .map_err(|e| EngineError::CsvDataFormatError(format!("{}: {}", path.display(), e)))?;

        let series = BarSeries::new(bars).tail(days);
        tracing::debug!(code = %symbol.code, count = series.len(), path = %path.display(), "Loaded bars from CSV");
        Ok(FetchedBars {
            series,
            provenance: DataProvenance::LocalFile,
        })
    }
}
