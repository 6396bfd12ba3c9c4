// engine/src/services/stock_service/mod.rs
// Hub for the stock data service: the StockDataService struct and its
// operations, with one handler module per operation.

use std::sync::Arc;

use shared::models::{ListingType, SimpleStockView, StockList, StockListing, StockResult};

use crate::config::EngineSettings;
use crate::data::{build_bar_source, BarSource};
use crate::error::EngineError;
use crate::indicators::IndicatorEngine;
use crate::symbols::SymbolRegistry;

pub mod cache;
pub mod get_multiple_stocks;
pub mod get_stock_data;
pub mod get_stock_simple;
pub mod helpers;

use cache::ResultCache;

/// Resolves names, fetches bars, runs indicators and memoizes the outcome.
///
/// Every lookup returns a `StockResult`; failures are reported in-band with
/// `success: false` and are never cached.
pub struct StockDataService {
    settings: EngineSettings,
    registry: Arc<SymbolRegistry>,
    source: Arc<dyn BarSource>,
    engine: Arc<IndicatorEngine>,
    cache: ResultCache,
}

impl StockDataService {
    pub fn new(settings: EngineSettings, registry: Arc<SymbolRegistry>, source: Arc<dyn BarSource>) -> Self {
        Self::with_engine(settings, registry, source, IndicatorEngine::default())
    }

    pub fn with_engine(
        settings: EngineSettings,
        registry: Arc<SymbolRegistry>,
        source: Arc<dyn BarSource>,
        engine: IndicatorEngine,
    ) -> Self {
        let cache = ResultCache::new(settings.cache.clone());
        StockDataService {
            settings,
            registry,
            source,
            engine: Arc::new(engine),
            cache,
        }
    }

    /// Wires the symbol table and bar source named by `settings`.
    pub fn from_settings(settings: EngineSettings) -> Result<Self, EngineError> {
        let registry = match &settings.symbol_table_path {
            Some(path) => SymbolRegistry::load(path)?,
            None => SymbolRegistry::load_default()?,
        };
        let source = build_bar_source(&settings)?;
        tracing::info!(
            symbols = registry.len(),
            source = source.name(),
            max_days = settings.max_days,
            "Stock data service ready"
        );
        Ok(Self::new(settings, Arc::new(registry), source))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn get_stock_data(&self, name: &str, days: i64) -> StockResult {
        get_stock_data::handle_get_stock_data(self, name, days).await
    }

    pub async fn get_multiple_stocks(&self, names: &[String], days: i64) -> Vec<StockResult> {
        get_multiple_stocks::handle_get_multiple_stocks(self, names, days).await
    }

    pub async fn get_stock_simple(&self, name: &str, days: i64) -> SimpleStockView {
        get_stock_simple::handle_get_stock_simple(self, name, days).await
    }

    pub fn search_stock(&self, keyword: &str) -> Vec<StockListing> {
        self.registry.search(keyword)
    }

    pub fn list_stocks(&self, search: Option<&str>, listing_type: Option<ListingType>) -> StockList {
        self.registry.list(search, listing_type)
    }

    /// Adds or updates a name. Cached results keep whatever they resolved to.
    pub fn add_stock(&self, name: &str, code: &str) {
        self.registry.add_stock(name, code);
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        tracing::info!("Result cache cleared");
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }
}
