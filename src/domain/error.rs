//! Domain error types.

/// Top-level error type for optrader.
#[derive(Debug, thiserror::Error)]
pub enum OptraderError {
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

    #[error("unknown strategy '{name}' (expected one of ma_crossover, rsi, breakout, straddle_sell)")]
    UnknownStrategy { name: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("insufficient data for {symbol}: have {bars} usable bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OptraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        OptraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&OptraderError> for std::process::ExitCode {
    fn from(err: &OptraderError) -> Self {
        let code: u8 = match err {
            OptraderError::Io(_) => 1,
            OptraderError::ConfigParse { .. }
            | OptraderError::ConfigMissing { .. }
            | OptraderError::ConfigInvalid { .. } => 2,
            OptraderError::UnknownStrategy { .. } => 4,
            OptraderError::Data { .. } | OptraderError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
