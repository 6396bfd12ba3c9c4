// Handler for batch lookups
use shared::models::StockResult;

use super::get_stock_data::handle_get_stock_data;
use super::StockDataService;

/// One result per requested name, in request order. A failing name does not
/// affect the others.
pub async fn handle_get_multiple_stocks(
    service: &StockDataService,
    names: &[String],
    days: i64,
) -> Vec<StockResult> {
    tracing::info!(count = names.len(), days, "Handling batch stock request");
    let mut results = Vec::with_capacity(names.len());
    for name in names {
        results.push(handle_get_stock_data(service, name, days).await);
    }
    let failed = results.iter().filter(|r| !r.success).count();
    if failed > 0 {
        tracing::warn!(failed, total = results.len(), "Batch request had failures");
    }
    results
}
