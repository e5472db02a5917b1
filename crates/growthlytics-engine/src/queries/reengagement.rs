use std::collections::{BTreeMap, HashSet};

use chrono::Duration;
use rand::Rng;

use growthlytics_core::analytics::ReengagementRow;
use growthlytics_core::config::ReengagementSettings;
use growthlytics_core::install::UnifiedInstall;
use growthlytics_core::normalize::round2;

/// Sample up to `sample_size` installs without replacement and return copies
/// shifted forward by `shift_days`, marked synthetic. A shifted time outside
/// the representable range becomes NULL.
pub fn simulate_repeat_installs<R: Rng + ?Sized>(
    installs: &[UnifiedInstall],
    settings: &ReengagementSettings,
    rng: &mut R,
) -> Vec<UnifiedInstall> {
    let amount = settings.sample_size.min(installs.len());
    if amount == 0 {
        return Vec::new();
    }
    let shift = Duration::try_days(settings.shift_days);

    rand::seq::index::sample(rng, installs.len(), amount)
        .iter()
        .map(|idx| {
            let mut repeat = installs[idx].clone();
            repeat.install_time = repeat
                .install_time
                .zip(shift)
                .and_then(|(t, shift)| t.checked_add_signed(shift));
            repeat.synthetic = true;
            repeat
        })
        .collect()
}

/// Per-row flag: the install came more than `gap_days` after the same user's
/// previous install.
///
/// Rows are visited in (user_id, install_time) order. The first install of a
/// user, installs without a user, and installs with a NULL time on either side
/// of the gap are never flagged.
pub fn flag_reengaged(installs: &[UnifiedInstall], gap_days: i64) -> Vec<bool> {
    let mut flags = vec![false; installs.len()];
    let Some(threshold) = Duration::try_days(gap_days) else {
        return flags;
    };
    let mut order: Vec<usize> = (0..installs.len())
        .filter(|&i| installs[i].user_id.is_some())
        .collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&installs[a], &installs[b]);
        a.user_id
            .cmp(&b.user_id)
            .then_with(|| a.install_time.cmp(&b.install_time))
    });

    for pair in order.windows(2) {
        let (prev, cur) = (&installs[pair[0]], &installs[pair[1]]);
        if prev.user_id != cur.user_id {
            continue;
        }
        if let (Some(prev_time), Some(cur_time)) = (prev.install_time, cur.install_time) {
            flags[pair[1]] = cur_time - prev_time > threshold;
        }
    }
    flags
}

/// Re-engaged and total distinct users per source, with their ratio.
///
/// Every source present in `installs` gets a row, zero-filled when none of its
/// users re-engaged.
pub fn reengagement_summary(installs: &[UnifiedInstall], gap_days: i64) -> Vec<ReengagementRow> {
    let flags = flag_reengaged(installs, gap_days);

    let mut by_source: BTreeMap<&str, (HashSet<&str>, HashSet<&str>)> = BTreeMap::new();
    for (install, reengaged) in installs.iter().zip(flags) {
        let (total, returning) = by_source.entry(install.source.as_str()).or_default();
        if let Some(user_id) = install.user_id.as_deref() {
            total.insert(user_id);
            if reengaged {
                returning.insert(user_id);
            }
        }
    }

    by_source
        .into_iter()
        .map(|(source, (total, returning))| {
            let total_users = total.len() as i64;
            let reengaged_users = returning.len() as i64;
            ReengagementRow {
                source: source.to_string(),
                reengaged_users,
                total_users,
                reengagement_rate: if total_users == 0 {
                    None
                } else {
                    round2(reengaged_users as f64 / total_users as f64)
                },
            }
        })
        .collect()
}
