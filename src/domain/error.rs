//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for scalptester.
#[derive(Debug, thiserror::Error)]
pub enum ScalpError {
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

    #[error("unknown strategy '{name}'")]
    UnknownStrategy { name: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    /// Bar series handed to the engine is not strictly time-ordered.
    #[error("bars out of order at index {index}: {current} does not follow {previous}")]
    UnorderedBars {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScalpError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ScalpError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ScalpError> for std::process::ExitCode {
    fn from(err: &ScalpError) -> Self {
        let code: u8 = match err {
            ScalpError::Io(_) => 1,
            ScalpError::ConfigParse { .. }
            | ScalpError::ConfigMissing { .. }
            | ScalpError::ConfigInvalid { .. } => 2,
            ScalpError::Data { .. } => 3,
            ScalpError::UnknownStrategy { .. } => 4,
            ScalpError::NoData { .. } | ScalpError::UnorderedBars { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
