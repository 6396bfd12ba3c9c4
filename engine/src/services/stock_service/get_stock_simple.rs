// Handler for the compact lookup
use shared::models::SimpleStockView;

use super::get_stock_data::handle_get_stock_data;
use super::StockDataService;

/// Like the full lookup but with the window capped at `simple_max_days`.
pub async fn handle_get_stock_simple(service: &StockDataService, name: &str, days: i64) -> SimpleStockView {
    let days = days.min(service.settings.simple_max_days as i64);
    let result = handle_get_stock_data(service, name, days).await;
    SimpleStockView::from(&result)
}
