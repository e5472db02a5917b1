use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use growthlytics_core::analytics::{Report, TableSource};
use growthlytics_core::config::Config;
use growthlytics_engine::{run_pipeline, CsvBackend};

use crate::render::render;

/// Load the input tables from `source`, run every stage, and write the report.
pub fn run_report<S, W>(source: &S, cfg: &Config, out: &mut W) -> Result<Report>
where
    S: TableSource + ?Sized,
    W: Write,
{
    let tables = source.read_tables().context("failed to load input tables")?;
    info!(
        installs = tables.install_count(),
        seed = cfg.pipeline.seed,
        "Input tables loaded"
    );

    let report = run_pipeline(&tables, &cfg.pipeline);
    render(&report, cfg.output, out).context("failed to write report")?;
    out.flush()?;
    Ok(report)
}

/// `run_report` against the CSV files in `cfg.data_dir`.
pub fn run_from_data_dir<W: Write>(cfg: &Config, out: &mut W) -> Result<Report> {
    let backend = CsvBackend::new(&cfg.data_dir);
    info!(data_dir = %backend.data_dir().display(), "Reading input tables");
    run_report(&backend, cfg, out)
}
