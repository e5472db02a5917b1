use anyhow::Result;
use tracing::info;

use growthlytics_core::config::Config;
use growthlytics_report::app::run_from_data_dir;

fn main() -> Result<()> {
    // Structured JSON logs go to stderr so stdout carries only the report.
    // Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("growthlytics=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    info!(
        output = ?cfg.output,
        mode = ?cfg.pipeline.timestamp_mode,
        reference_date = %cfg.pipeline.reference_date,
        "Starting report run"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = run_from_data_dir(&cfg, &mut out)?;

    info!(
        ltv_rows = report.ltv_by_source.len(),
        reengagement_rows = report.reengagement.len(),
        attribution_rows = report.attribution.len(),
        "Report written"
    );
    Ok(())
}
