// Bar sources: live providers, local CSV files and generated data
pub mod csv_parser;
pub mod eastmoney;
pub mod source;
pub mod synthetic;
pub mod yahoo;

use std::sync::Arc;

pub use csv_parser::CsvBarSource;
pub use eastmoney::EastmoneyBarSource;
pub use source::{BarSource, FallbackBarSource, FetchedBars, MarketRoutedSource};
pub use synthetic::SyntheticBarSource;
pub use yahoo::YahooBarSource;

use crate::config::{DataSourceKind, EngineSettings};
use crate::error::EngineError;

/// Builds the configured source, wrapped with the synthetic fallback when enabled.
pub fn build_bar_source(settings: &EngineSettings) -> Result<Arc<dyn BarSource>, EngineError> {
    let primary: Arc<dyn BarSource> = match settings.data_source {
        DataSourceKind::Live => Arc::new(MarketRoutedSource::new(
            Arc::new(EastmoneyBarSource::new(settings.http_timeout())?),
            Arc::new(YahooBarSource::new(settings.http_timeout())?),
        )),
        DataSourceKind::Csv => Arc::new(CsvBarSource::new(settings.csv_data_dir.clone())),
        DataSourceKind::Synthetic => return Ok(Arc::new(SyntheticBarSource::new())),
    };

    if settings.synthetic_fallback {
        Ok(Arc::new(FallbackBarSource::new(primary, Arc::new(SyntheticBarSource::new()))))
    } else {
        Ok(primary)
    }
}
