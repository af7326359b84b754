use thiserror::Error;

/// Result type local to slimframe-io.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unsupported codec: {0}")]
    CodecUnsupported(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("corrupt blob: {0}")]
    Corrupt(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("category '{category}' is in the {actual} phase, expected {expected}")]
    PhaseMismatch {
        category: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Core(#[from] slimframe_core::Error),
}
