use thiserror::Error;

/// Fatal ingestion failures. Bad cell values never end up here; they become NULL.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {table} table at {path}: {source}")]
    Open {
        table: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{table} table is missing required column {column:?}")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("failed to read {table} table: {source}")]
    Read {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
}
