//! Live daily bars from the Yahoo Finance chart endpoint, used for codes
//! outside the Shanghai/Shenzhen/Hong Kong markets (US tickers and the like).

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use shared::models::{Bar, BarSeries, DataProvenance};

use super::source::{BarSource, FetchedBars};
use crate::error::EngineError;
use crate::symbols::ResolvedSymbol;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

// Columns are aligned with `timestamp`; Yahoo leaves holes as null.
#[derive(Debug, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooBarSource {
    client: Client,
}

impl YahooBarSource {
    pub fn new(timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36")
            .build()?;
        Ok(YahooBarSource { client })
    }

    /// Smallest chart range holding `days` trading sessions.
    pub fn range_for(days: usize) -> &'static str {
        if days <= 5 {
            "5d"
        } else if days <= 20 {
            "1mo"
        } else if days <= 60 {
            "3mo"
        } else if days <= 120 {
            "6mo"
        } else if days <= 250 {
            "1y"
        } else {
            "2y"
        }
    }

    /// Decodes a chart response. Sessions with a missing price are skipped;
    /// a missing volume counts as zero.
    pub fn parse_response(body: &str) -> Result<Vec<Bar>> {
        let response: ChartResponse = serde_json::from_str(body).context("malformed chart response")?;
        if let Some(err) = response.chart.error {
            return Err(anyhow!(
                "chart error {}: {}",
                err.code.unwrap_or_default(),
                err.description.unwrap_or_default()
            ));
        }
        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| anyhow!("response carries no chart result"))?;
        let offset = result.meta.map_or(0, |m| m.gmtoffset);
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("response carries no quote columns"))?;

        let column = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();
        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let (Some(open), Some(high), Some(low), Some(close)) = (
                column(&quote.open, i),
                column(&quote.high, i),
                column(&quote.low, i),
                column(&quote.close, i),
            ) else {
                tracing::trace!(timestamp = ts, "Skipping session with missing prices");
                continue;
            };
            // exchange-local calendar date
            let date = DateTime::from_timestamp(ts + offset, 0)
                .ok_or_else(|| anyhow!("timestamp out of range: {}", ts))?
                .date_naive();
            bars.push(Bar {
                date,
                open,
                high,
                low,
                close,
                volume: column(&quote.volume, i).unwrap_or(0.0).max(0.0).round() as u64,
            });
        }
        Ok(bars)
    }
}

#[async_trait]
impl BarSource for YahooBarSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &ResolvedSymbol, days: usize) -> Result<FetchedBars, EngineError> {
        let url = format!("{}/{}", CHART_URL, symbol.code);
        let range = Self::range_for(days);

        tracing::debug!(code = %symbol.code, range, days, "Requesting daily chart");
        let body = self
            .client
            .get(&url)
            .query(&[("interval", "1d"), ("range", range)])
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
