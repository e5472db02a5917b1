use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use growthlytics_core::analytics::AttributionRow;
use growthlytics_core::install::UnifiedInstall;
use growthlytics_core::ledger::{CostRecord, RevenueRecord};
use growthlytics_core::normalize::round2;

type WeekSource = (NaiveDate, String);

#[derive(Debug, Default)]
struct InstallBucket<'a> {
    users: HashSet<&'a str>,
    revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyInstallMetrics {
    pub installs: i64,
    pub revenue: f64,
}

/// Installs and joined revenue per (install_week, source).
///
/// Each install is joined with every revenue record of its user, so a user
/// installing twice in one week contributes their revenue twice. NULL amounts
/// add nothing. Installs without a time are dropped; installs without a user
/// keep their bucket alive but add no user and no revenue.
pub fn weekly_install_metrics(
    installs: &[UnifiedInstall],
    revenues: &[RevenueRecord],
) -> BTreeMap<WeekSource, WeeklyInstallMetrics> {
    let mut revenue_by_user: HashMap<&str, f64> = HashMap::new();
    for record in revenues {
        if let Some(user_id) = record.user_id.as_deref() {
            *revenue_by_user.entry(user_id).or_insert(0.0) += record.revenue.unwrap_or(0.0);
        }
    }

    let mut buckets: BTreeMap<WeekSource, InstallBucket<'_>> = BTreeMap::new();
    for install in installs {
        let Some(week) = install.install_week() else {
            continue;
        };
        let bucket = buckets.entry((week, install.source.clone())).or_default();
        if let Some(user_id) = install.user_id.as_deref() {
            bucket.users.insert(user_id);
            bucket.revenue += revenue_by_user.get(user_id).copied().unwrap_or(0.0);
        }
    }

    buckets
        .into_iter()
        .map(|(key, bucket)| {
            (
                key,
                WeeklyInstallMetrics {
                    installs: bucket.users.len() as i64,
                    revenue: bucket.revenue,
                },
            )
        })
        .collect()
}

/// Spend per (week, channel). NULL amounts add nothing.
pub fn weekly_spend(costs: &[CostRecord]) -> BTreeMap<WeekSource, f64> {
    let mut spend: BTreeMap<WeekSource, f64> = BTreeMap::new();
    for record in costs {
        let (Some(week), Some(channel)) = (record.week(), record.media_channel.as_deref()) else {
            continue;
        };
        *spend.entry((week, channel.to_string())).or_insert(0.0) += record.spend.unwrap_or(0.0);
    }
    spend
}

/// Inner join of weekly install metrics and weekly spend, with CAC and ROAS.
///
/// CAC is NULL when there are no installs; ROAS is NULL when spend is zero.
/// Rows come out ordered by week, then source.
pub fn weekly_attribution(
    installs: &[UnifiedInstall],
    revenues: &[RevenueRecord],
    costs: &[CostRecord],
) -> Vec<AttributionRow> {
    let metrics = weekly_install_metrics(installs, revenues);
    let weekly_costs = weekly_spend(costs);

    metrics
        .into_iter()
        .filter_map(|(key, m)| {
            let spend = *weekly_costs.get(&key)?;
            let (install_week, source) = key;
            let cac = (m.installs > 0)
                .then(|| round2(spend / m.installs as f64))
                .flatten();
            let roas = (spend != 0.0).then(|| round2(m.revenue / spend)).flatten();
            Some(AttributionRow {
                install_week,
                source,
                installs: m.installs,
                revenue: m.revenue,
                spend,
                cac,
                roas,
            })
        })
        .collect()
}
