// Handler for the full single-stock lookup
use std::sync::Arc;

use shared::models::StockResult;

use super::helpers::assemble_result;
use super::StockDataService;
use crate::error::EngineError;

pub async fn handle_get_stock_data(service: &StockDataService, name: &str, days: i64) -> StockResult {
    let days = service.settings.clamp_days(days);
    tracing::info!(stock_name = %name, days, "Handling stock data request");

    if let Some(hit) = service.cache.get(name, days).await {
        tracing::debug!(stock_name = %name, days, "Serving cached result");
        return (*hit).clone();
    }

    match build_result(service, name, days).await {
        Ok(result) => {
            service.cache.insert(name, days, Arc::new(result.clone())).await;
            result
        }
        Err(e) => {
            tracing::warn!(stock_name = %name, days, error_detail = %e, "Stock data request failed");
            StockResult::failure(name, e.to_string())
        }
    }
}

async fn build_result(service: &StockDataService, name: &str, days: usize) -> Result<StockResult, EngineError> {
    let symbol = service
        .registry
        .resolve(name)
        .ok_or_else(|| EngineError::SymbolNotFound(name.to_string()))?;
    tracing::debug!(stock_name = %name, code = %symbol.code, matched = %symbol.matched_name, "Resolved symbol");

    // A panicking adapter must end in a failure result like any other fetch error.
    let source = Arc::clone(&service.source);
    let request = symbol.clone();
    let fetched = tokio::spawn(async move { source.fetch(&request, days).await })
        .await
        .map_err(|e| EngineError::task_fault("bar fetch", e))??;
    if fetched.series.is_empty() {
        return Err(EngineError::unavailable(&symbol.code, "source returned no bars"));
    }

    // Indicator math is CPU-bound and must not take the service down if it panics.
    let engine = Arc::clone(&service.engine);
    let series = fetched.series.clone();
    let indicators = tokio::task::spawn_blocking(move || engine.calculate_all(&series)).await?;

    let result = assemble_result(name, &symbol, &fetched, indicators);
    tracing::info!(
        stock_name = %name,
        code = %symbol.code,
        count = fetched.series.len(),
        provenance = ?fetched.provenance,
        "Stock data assembled"
    );
    Ok(result)
}
