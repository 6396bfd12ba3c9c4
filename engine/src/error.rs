use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Stock not found: {0}")]
    SymbolNotFound(String),

    #[error("No bar data available for {code}: {reason}")]
    DataUnavailable { code: String, reason: String },

    #[error("HTTP request failed: {source}")]
    HttpError {
        #[from]
        source: reqwest::Error,
    },

    #[error("Provider payload error: {0}")]
    ProviderFormatError(String),

    #[error("Indicator calculation error: {0}")]
    IndicatorError(String),

    #[error("Computation fault: {0}")]
    ComputationFault(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    pub fn unavailable(code: &str, reason: impl Into<String>) -> Self {
        EngineError::DataUnavailable {
            code: code.to_string(),
            reason: reason.into(),
        }
    }
}

impl EngineError {
    /// Maps a task that panicked or was cancelled during `stage` to a
    /// `ComputationFault` carrying the panic message when there is one.
    pub fn task_fault(stage: &str, err: tokio::task::JoinError) -> Self {
        tracing::error!(stage, "Task did not complete: {:?}", err);
        if !err.is_panic() {
            return EngineError::ComputationFault(format!("{}: {}", stage, err));
        }
        let payload = err.into_panic();
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned());
        match detail {
            Some(detail) => EngineError::ComputationFault(format!("{} panicked: {}", stage, detail)),
            None => EngineError::ComputationFault(format!("{} panicked", stage)),
        }
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::task_fault("indicator computation", err)
    }
}
