use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid timestamp mode {0:?}; expected one of: synthetic, aligned, parsed")]
    InvalidTimestampMode(String),

    #[error("invalid output format {0:?}; expected one of: table, csv, json")]
    InvalidOutputFormat(String),
}
