//! Stage wiring: union → identity → timestamps → LTV → re-engagement → attribution.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use growthlytics_core::analytics::{InputTables, Report};
use growthlytics_core::config::PipelineSettings;
use growthlytics_core::install::UnifiedInstall;

use crate::queries::attribution::weekly_attribution;
use crate::queries::identity::{reconcile_timestamps, resolve_identity, union_installs};
use crate::queries::ltv::{latest_sources, ltv_by_source, segment_users};
use crate::queries::reengagement::{reengagement_summary, simulate_repeat_installs};

/// Union, resolve, and reconcile the three install tables.
pub fn unified_installs<R: Rng + ?Sized>(
    tables: &InputTables,
    settings: &PipelineSettings,
    rng: &mut R,
) -> Vec<UnifiedInstall> {
    let union = union_installs(tables);
    let resolved = resolve_identity(union, &tables.mapping);
    let unresolved = resolved.iter().filter(|i| i.user_id.is_none()).count();
    info!(
        installs = resolved.len(),
        unresolved,
        mode = ?settings.timestamp_mode,
        "Unified install set"
    );
    reconcile_timestamps(resolved, settings, rng)
}

/// Run every stage with an RNG seeded from `settings.seed`.
///
/// The same tables and settings always produce the same report.
pub fn run_pipeline(tables: &InputTables, settings: &PipelineSettings) -> Report {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut installs = unified_installs(tables, settings, &mut rng);

    let users = segment_users(&tables.revenues);
    let ltv_rows = ltv_by_source(&users, &latest_sources(&installs));
    info!(users = users.len(), rows = ltv_rows.len(), "LTV segmentation done");

    let repeats = simulate_repeat_installs(&installs, &settings.reengagement, &mut rng);
    installs.extend(repeats);
    let reengagement = reengagement_summary(&installs, settings.reengagement.gap_days);
    info!(
        installs = installs.len(),
        synthetic = installs.iter().filter(|i| i.synthetic).count(),
        sources = reengagement.len(),
        "Re-engagement summarized"
    );

    let attribution = weekly_attribution(&installs, &tables.revenues, &tables.costs);
    info!(
        rows = attribution.len(),
        printable = attribution.iter().filter(|row| row.has_metrics()).count(),
        "Weekly attribution joined"
    );

    Report {
        ltv_by_source: ltv_rows,
        reengagement,
        attribution,
    }
}
