// Bar source contract and the fallback combinator
use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{BarSeries, DataProvenance, InstrumentClass};

use crate::error::EngineError;
use crate::symbols::ResolvedSymbol;

/// A normalized series together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedBars {
    pub series: BarSeries,
    pub provenance: DataProvenance,
}

/// Supplies daily bars for a resolved instrument.
///
/// Implementations return bars sorted ascending by date and at most `days`
/// of them. Fewer bars than requested is not an error.
#[async_trait]
pub trait BarSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, symbol: &ResolvedSymbol, days: usize) -> Result<FetchedBars, EngineError>;
}

/// Uses `fallback` when `primary` fails or returns nothing.
pub struct FallbackBarSource {
    name: String,
    primary: Arc<dyn BarSource>,
    fallback: Arc<dyn BarSource>,
}

impl FallbackBarSource {
    pub fn new(primary: Arc<dyn BarSource>, fallback: Arc<dyn BarSource>) -> Self {
        FallbackBarSource {
            name: format!("{}+{}", primary.name(), fallback.name()),
            primary,
            fallback,
        }
    }
}

#[async_trait]
impl BarSource for FallbackBarSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, symbol: &ResolvedSymbol, days: usize) -> Result<FetchedBars, EngineError> {
        match self.primary.fetch(symbol, days).await {
            Ok(fetched) if !fetched.series.is_empty() => Ok(fetched),
            Ok(_) => {
                tracing::warn!(
                    code = %symbol.code,
                    source = self.primary.name(),
                    fallback = self.fallback.name(),
                    "Primary source returned no bars, using fallback"
                );
                self.fallback.fetch(symbol, days).await
            }
            Err(e) => {
                tracing::warn!(
                    code = %symbol.code,
                    source = self.primary.name(),
                    fallback = self.fallback.name(),
                    error_detail = %e,
                    "Primary source failed, using fallback"
                );
                self.fallback.fetch(symbol, days).await
            }
        }
    }
}

/// Sends domestic, index and Hong Kong codes to `domestic`, everything else
/// (US tickers and other markets) to `other`.
pub struct MarketRoutedSource {
    name: String,
    domestic: Arc<dyn BarSource>,
    other: Arc<dyn BarSource>,
}

impl MarketRoutedSource {
    pub fn new(domestic: Arc<dyn BarSource>, other: Arc<dyn BarSource>) -> Self {
        MarketRoutedSource {
            name: format!("{}|{}", domestic.name(), other.name()),
            domestic,
            other,
        }
    }

    fn route(&self, class: InstrumentClass) -> &Arc<dyn BarSource> {
        match class {
            InstrumentClass::DomesticEquity | InstrumentClass::Index | InstrumentClass::HkEquity => &self.domestic,
            InstrumentClass::OtherEquity => &self.other,
        }
    }
}

#[async_trait]
impl BarSource for MarketRoutedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, symbol: &ResolvedSymbol, days: usize) -> Result<FetchedBars, EngineError> {
        let source = self.route(symbol.class);
        tracing::debug!(code = %symbol.code, class = ?symbol.class, source = source.name(), "Routing bar request");
        source.fetch(symbol, days).await
    }
}
