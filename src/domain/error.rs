//! Domain error types.

/// Top-level error type for tvltracker.
#[derive(Debug, thiserror::Error)]
pub enum TvlError {
    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for TvlError {
    fn from(err: csv::Error) -> Self {
        TvlError::Csv {
            reason: err.to_string(),
        }
    }
}

impl From<&TvlError> for std::process::ExitCode {
    fn from(err: &TvlError) -> Self {
        let code: u8 = match err {
            TvlError::Io(_) | TvlError::Csv { .. } => 1,
            TvlError::ConfigParse { .. } | TvlError::ConfigInvalid { .. } => 2,
            TvlError::Transport { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}
