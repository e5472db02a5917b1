use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use rand::Rng;

use growthlytics_core::analytics::InputTables;
use growthlytics_core::config::{PipelineSettings, TimestampMode};
use growthlytics_core::install::{IdentityMapping, InstallEvent, UnifiedInstall};
use growthlytics_core::normalize::normalize_source;

/// Concatenate the three install tables in google, rest, organic order.
pub fn union_installs(tables: &InputTables) -> Vec<InstallEvent> {
    let mut installs = Vec::with_capacity(tables.install_count());
    installs.extend_from_slice(&tables.installs_google);
    installs.extend_from_slice(&tables.installs_rest);
    installs.extend_from_slice(&tables.installs_organic);
    installs
}

/// Left join installs against the mapping on `visitor_id`.
///
/// A visitor with several mapping rows yields one install per row, in mapping
/// order. Unmatched or NULL visitor ids keep a NULL `user_id`.
pub fn resolve_identity(
    installs: Vec<InstallEvent>,
    mapping: &[IdentityMapping],
) -> Vec<UnifiedInstall> {
    let mut by_visitor: HashMap<&str, Vec<Option<&str>>> = HashMap::new();
    for row in mapping {
        if let Some(vst_id) = row.vst_id.as_deref() {
            by_visitor
                .entry(vst_id)
                .or_default()
                .push(row.user_id.as_deref());
        }
    }

    let mut resolved = Vec::with_capacity(installs.len());
    for install in installs {
        let source = normalize_source(&install.source);
        let matches = install
            .visitor_id
            .as_deref()
            .and_then(|visitor| by_visitor.get(visitor));
        match matches {
            Some(user_ids) => {
                for user_id in user_ids {
                    resolved.push(UnifiedInstall {
                        visitor_id: install.visitor_id.clone(),
                        user_id: user_id.map(str::to_string),
                        install_time: install.install_time,
                        source: source.clone(),
                        synthetic: false,
                    });
                }
            }
            None => resolved.push(UnifiedInstall {
                visitor_id: install.visitor_id,
                user_id: None,
                install_time: install.install_time,
                source,
                synthetic: false,
            }),
        }
    }
    resolved
}

/// Bring install times into the cost ledger's window according to
/// `settings.timestamp_mode`. Only `Synthetic` draws from `rng`.
pub fn reconcile_timestamps<R: Rng + ?Sized>(
    mut installs: Vec<UnifiedInstall>,
    settings: &PipelineSettings,
    rng: &mut R,
) -> Vec<UnifiedInstall> {
    let Some(anchor) = settings.reference_date.and_hms_opt(0, 0, 0) else {
        return installs;
    };

    match settings.timestamp_mode {
        TimestampMode::Parsed => {}
        TimestampMode::Synthetic => {
            let window = i64::from(settings.window_days.max(1));
            for install in &mut installs {
                let offset = rng.gen_range(0..window);
                install.install_time =
                    Duration::try_days(offset).and_then(|d| anchor.checked_add_signed(d));
            }
        }
        TimestampMode::Aligned => {
            let earliest = installs
                .iter()
                .filter_map(|install| install.install_date())
                .min();
            if let Some(earliest) = earliest {
                let shift = settings.reference_date - earliest;
                for install in &mut installs {
                    install.install_time = install.install_time.map(|t| shift_by(t, shift));
                }
            }
        }
    }
    installs
}

fn shift_by(time: NaiveDateTime, shift: Duration) -> NaiveDateTime {
    time.checked_add_signed(shift).unwrap_or(time)
}
