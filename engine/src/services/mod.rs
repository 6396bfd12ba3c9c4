// Request-level services built on the symbol, data and indicator layers
pub mod stock_service;

pub use stock_service::StockDataService;
