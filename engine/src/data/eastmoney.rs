//! Live daily k-lines from the Eastmoney quote history endpoint.
//!
//! Covers Shanghai/Shenzhen equities, their indices and Hong Kong equities.
//! Other markets are reported as unavailable; `YahooBarSource` serves them.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use shared::models::{Bar, BarSeries, DataProvenance, InstrumentClass};

use super::source::{BarSource, FetchedBars};
use crate::error::EngineError;
use crate::symbols::ResolvedSymbol;

const KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";

#[derive(Debug, Deserialize)]
struct KlineResponse {
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    #[serde(default)]
    klines: Vec<String>,
}

pub struct EastmoneyBarSource {
    client: Client,
}

impl EastmoneyBarSource {
    pub fn new(timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36")
            .build()?;
        Ok(EastmoneyBarSource { client })
    }

    /// Market-qualified id: `1.` Shanghai, `0.` Shenzhen/Beijing, `116.` Hong Kong.
    pub fn secid(symbol: &ResolvedSymbol) -> Option<String> {
        let code = symbol.code.as_str();
        match symbol.class {
            InstrumentClass::Index if code.starts_with("399") => Some(format!("0.{}", code)),
            InstrumentClass::Index => Some(format!("1.{}", code)),
            InstrumentClass::DomesticEquity if code.starts_with(['5', '6', '9']) => Some(format!("1.{}", code)),
            InstrumentClass::DomesticEquity => Some(format!("0.{}", code)),
            InstrumentClass::HkEquity => Some(format!("116.{}", code)),
            InstrumentClass::OtherEquity => None,
        }
    }

    /// Decodes a response body. Each k-line is `date,open,close,high,low,volume[,...]`.
    pub fn parse_response(body: &str) -> Result<Vec<Bar>> {
        let response: KlineResponse = serde_json::from_str(body).context("malformed k-line response")?;
        let data = response.data.ok_or_else(|| anyhow!("response carries no data (unknown instrument?)"))?;
        data.klines
            .iter()
            .enumerate()
            .map(|(idx, line)| Self::parse_kline(line).with_context(|| format!("k-line #{}: '{}'", idx, line)))
            .collect()
    }

    fn parse_kline(line: &str) -> Result<Bar> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 6 {
            return Err(anyhow!("expected at least 6 fields, got {}", fields.len()));
        }
        let number = |i: usize, name: &str| -> Result<f64> {
            fields[i].trim().parse::<f64>().with_context(|| format!("invalid {}", name))
        };
        let date = NaiveDate::parse_from_str(fields[0].trim(), "%Y-%m-%d").context("invalid date")?;
        let volume = number(5, "volume")?;
        Ok(Bar {
            date,
            open: number(1, "open")?,
            close: number(2, "close")?,
            high: number(3, "high")?,
            low: number(4, "low")?,
            volume: volume.max(0.0).round() as u64,
        })
    }
}

#[async_trait]
impl BarSource for EastmoneyBarSource {
    fn name(&self) -> &str {
        "eastmoney"
    }

    async fn fetch(&self, symbol: &ResolvedSymbol, days: usize) -> Result<FetchedBars, EngineError> {
        let secid = Self::secid(symbol)
            .ok_or_else(|| EngineError::unavailable(&symbol.code, "market not covered by eastmoney source"))?;
        let limit = days.to_string();

        tracing::debug!(code = %symbol.code, %secid, days, "Requesting daily k-lines");
        let body = self
            .client
            .get(KLINE_URL)
            .query(&[
                ("secid", secid.as_str()),
                ("fields1", "f1,f2,f3,f4,f5,f6"),
                ("fields2", "f51,f52,f53,f54,f55,f56"),
                ("klt", "101"),
                ("fqt", "1"),
                ("end", "20500101"),
                ("lmt", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let bars = Self::parse_response(&body).map_err(|e| EngineError::ProviderFormatError(format!("{:#}", e)))?;
        let series = BarSeries::new(bars).tail(days);
        tracing::info!(code = %symbol.code, count = series.len(), "Fetched live bars");
        Ok(FetchedBars {
            series,
            provenance: DataProvenance::Live,
        })
    }
}
