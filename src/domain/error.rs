//! Domain error types.

/// Top-level error type for regimelab.
#[derive(Debug, thiserror::Error)]
pub enum RegimeLabError {
    #[error("no price data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient history for {symbol}: have {observations} observations, need {minimum}")]
    InsufficientHistory {
        symbol: String,
        observations: usize,
        minimum: usize,
    },

    #[error("invalid price series for {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("classifier contract violated: {reason}")]
    ContractViolation { reason: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error("watchlist error: {reason}")]
    Watchlist { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RegimeLabError {
    /// Per-symbol data problems that a batch over many symbols records and
    /// steps past. Connection, pool and config failures stay fatal.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            RegimeLabError::DataUnavailable { .. }
                | RegimeLabError::InsufficientHistory { .. }
                | RegimeLabError::InvalidSeries { .. }
        )
    }
}

impl From<&RegimeLabError> for std::process::ExitCode {
    fn from(err: &RegimeLabError) -> Self {
        let code: u8 = match err {
            RegimeLabError::Io(_)
            | RegimeLabError::Report { .. }
            | RegimeLabError::Watchlist { .. } => 1,
            RegimeLabError::ConfigParse { .. }
            | RegimeLabError::ConfigMissing { .. }
            | RegimeLabError::ConfigInvalid { .. } => 2,
            RegimeLabError::Database { .. } | RegimeLabError::DatabaseQuery { .. } => 3,
            RegimeLabError::ContractViolation { .. }
            | RegimeLabError::InvalidInput { .. }
            | RegimeLabError::InvalidSeries { .. } => 4,
            RegimeLabError::DataUnavailable { .. }
            | RegimeLabError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
