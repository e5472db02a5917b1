pub mod backend;
pub mod error;
pub mod ingest;
pub mod parse;
pub mod pipeline;
pub mod queries;
pub mod schema;

pub use backend::CsvBackend;
pub use pipeline::run_pipeline;
