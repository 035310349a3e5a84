//! Domain error types.

/// Top-level error type for dcacompare.
#[derive(Debug, thiserror::Error)]
pub enum DcaError {
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

    #[error("failed to read {path}: {reason}")]
    DataRead { path: String, reason: String },

    #[error("line {line}: {reason}")]
    DataParse { line: u64, reason: String },

    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("invalid close price {close} on {date}")]
    InvalidPrice { date: chrono::NaiveDate, close: f64 },

    #[error("no price data available")]
    NoData,

    #[error("failed to write report {path}: {reason}")]
    Report { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DcaError> for std::process::ExitCode {
    fn from(err: &DcaError) -> Self {
        let code: u8 = match err {
            DcaError::Io(_) | DcaError::Report { .. } => 1,
            DcaError::ConfigParse { .. }
            | DcaError::ConfigMissing { .. }
            | DcaError::ConfigInvalid { .. } => 2,
            DcaError::DataRead { .. }
            | DcaError::DataParse { .. }
            | DcaError::MissingColumn { .. }
            | DcaError::InvalidPrice { .. } => 3,
            DcaError::NoData => 5,
        };
        std::process::ExitCode::from(code)
    }
}
