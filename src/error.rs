use thiserror::Error;

/// Errors surfaced to the caller when an operation is rejected.
#[derive(Debug, Error)]
pub enum Error {
    #[error("callsign {0} already exists")]
    DuplicateCallsign(String),

    #[error("callsign must not be empty")]
    EmptyCallsign,

    #[error("invalid value {value:?} for {field}")]
    InvalidAttribute { field: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
