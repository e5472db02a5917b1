use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use growthlytics_core::analytics::{LtvBySourceRow, LtvTier, UserLtv};
use growthlytics_core::install::UnifiedInstall;
use growthlytics_core::ledger::RevenueRecord;

/// Upper edges of the Low and Medium tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierEdges {
    pub low_max: f64,
    pub medium_max: f64,
}

impl TierEdges {
    pub fn tier_for(&self, total_revenue: f64) -> LtvTier {
        if total_revenue <= self.low_max {
            LtvTier::Low
        } else if total_revenue <= self.medium_max {
            LtvTier::Medium
        } else {
            LtvTier::High
        }
    }
}

/// Sum revenue per user. NULL amounts add nothing, so a user whose amounts
/// are all NULL totals 0.
pub fn total_revenue_by_user(revenues: &[RevenueRecord]) -> BTreeMap<&str, f64> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in revenues {
        let Some(user_id) = record.user_id.as_deref() else {
            continue;
        };
        *totals.entry(user_id).or_insert(0.0) += record.revenue.unwrap_or(0.0);
    }
    totals
}

/// Linear-interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Tertile edges of the observed distribution, or `None` when it is empty.
///
/// Equal edges are kept as-is: the tier between them is simply empty.
pub fn tertile_edges(totals: &[f64]) -> Option<TierEdges> {
    if totals.is_empty() {
        return None;
    }
    let mut sorted = totals.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(TierEdges {
        low_max: quantile(&sorted, 1.0 / 3.0),
        medium_max: quantile(&sorted, 2.0 / 3.0),
    })
}

/// Every user with a revenue record, tiered by tertile. Ordered by user id.
pub fn segment_users(revenues: &[RevenueRecord]) -> Vec<UserLtv> {
    let valid: Vec<(&str, f64)> = total_revenue_by_user(revenues).into_iter().collect();

    let totals: Vec<f64> = valid.iter().map(|(_, total)| *total).collect();
    let Some(edges) = tertile_edges(&totals) else {
        return Vec::new();
    };
    tracing::debug!(
        users = valid.len(),
        low_max = edges.low_max,
        medium_max = edges.medium_max,
        "Computed LTV tier edges"
    );

    valid
        .into_iter()
        .map(|(user_id, total_revenue)| UserLtv {
            user_id: user_id.to_string(),
            total_revenue,
            ltv_tier: edges.tier_for(total_revenue),
        })
        .collect()
}

/// Source of each user's most recent install.
///
/// Installs are ordered by time with NULL times last, stably, so among equal
/// times the row seen last wins and an undated install outranks dated ones.
pub fn latest_sources(installs: &[UnifiedInstall]) -> HashMap<&str, &str> {
    let mut ordered: Vec<&UnifiedInstall> =
        installs.iter().filter(|i| i.user_id.is_some()).collect();
    ordered.sort_by_key(|install| (install.install_time.is_none(), install.install_time));

    let mut latest = HashMap::new();
    for install in ordered {
        if let Some(user_id) = install.user_id.as_deref() {
            latest.insert(user_id, install.source.as_str());
        }
    }
    latest
}

fn compare_sources(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Distinct users per (latest source, tier). Users without a resolved install
/// land in the NULL-source rows, which sort last.
pub fn ltv_by_source(users: &[UserLtv], latest: &HashMap<&str, &str>) -> Vec<LtvBySourceRow> {
    let mut groups: HashMap<(Option<String>, LtvTier), HashSet<&str>> = HashMap::new();
    for user in users {
        let source = latest.get(user.user_id.as_str()).map(|s| s.to_string());
        groups
            .entry((source, user.ltv_tier))
            .or_default()
            .insert(user.user_id.as_str());
    }

    let mut rows: Vec<LtvBySourceRow> = groups
        .into_iter()
        .map(|((source, ltv_tier), user_ids)| LtvBySourceRow {
            source,
            ltv_tier,
            user_count: user_ids.len() as i64,
        })
        .collect();
    rows.sort_by(|a, b| {
        compare_sources(&a.source, &b.source).then_with(|| a.ltv_tier.cmp(&b.ltv_tier))
    });
    rows
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn revenue(user: &str, amount: Option<f64>) -> RevenueRecord {
        RevenueRecord {
            user_id: Some(user.to_string()),
            period: None,
            revenue: amount,
        }
    }

    fn install(user: Option<&str>, source: &str, day: Option<u32>) -> UnifiedInstall {
        UnifiedInstall {
            visitor_id: None,
            user_id: user.map(str::to_string),
            install_time: day.and_then(|d| {
                NaiveDate::from_ymd_opt(2025, 1, d).and_then(|date| date.and_hms_opt(0, 0, 0))
            }),
            source: source.to_string(),
            synthetic: false,
        }
    }

    fn tier_counts(users: &[UserLtv]) -> [usize; 3] {
        let mut counts = [0; 3];
        for user in users {
            counts[user.ltv_tier as usize] += 1;
        }
        counts
    }

    #[test]
    fn totals_skip_null_amounts() {
        let revenues = vec![
            revenue("u1", Some(10.0)),
            revenue("u1", None),
            revenue("u1", Some(20.0)),
            revenue("u2", None),
            RevenueRecord {
                user_id: None,
                period: None,
                revenue: Some(99.0),
            },
        ];
        let totals = total_revenue_by_user(&revenues);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["u1"], 30.0);
        assert_eq!(totals["u2"], 0.0);
    }

    #[test]
    fn tertiles_split_evenly() {
        let revenues: Vec<_> = (1..=9)
            .map(|i| revenue(&format!("u{i}"), Some(f64::from(i))))
            .collect();
        let users = segment_users(&revenues);
        assert_eq!(users.len(), 9);
        assert_eq!(tier_counts(&users), [3, 3, 3]);
    }

    #[test]
    fn tertiles_are_within_one_for_uneven_counts() {
        let revenues: Vec<_> = (1..=10)
            .map(|i| revenue(&format!("u{i}"), Some(f64::from(i) * 7.5)))
            .collect();
        let counts = tier_counts(&segment_users(&revenues));
        let max = counts.iter().max().copied().unwrap_or_default();
        let min = counts.iter().min().copied().unwrap_or_default();
        assert!(max - min <= 1, "unbalanced tiers: {counts:?}");
    }

    #[test]
    fn duplicate_edges_collapse_middle_tier() {
        let revenues = vec![
            revenue("u1", Some(5.0)),
            revenue("u2", Some(5.0)),
            revenue("u3", Some(5.0)),
            revenue("u4", Some(5.0)),
            revenue("u5", Some(100.0)),
        ];
        let users = segment_users(&revenues);
        assert_eq!(tier_counts(&users), [4, 0, 1]);
    }

    #[test]
    fn blank_amounts_keep_user_and_tier_edges() {
        let with_blank = vec![
            revenue("u1", Some(10.0)),
            revenue("u1", None),
            revenue("u1", Some(20.0)),
            revenue("u2", Some(5.0)),
            revenue("u3", Some(50.0)),
        ];
        let users = segment_users(&with_blank);
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].user_id, "u1");
        assert_eq!(users[0].total_revenue, 30.0);
        assert_eq!(users[0].ltv_tier, LtvTier::Medium);

        let without_blank: Vec<_> = with_blank
            .iter()
            .filter(|r| r.revenue.is_some())
            .cloned()
            .collect();
        let totals = |users: &[UserLtv]| -> Vec<f64> {
            users.iter().map(|u| u.total_revenue).collect()
        };
        assert_eq!(
            tertile_edges(&totals(&users)),
            tertile_edges(&totals(&segment_users(&without_blank)))
        );
        assert!(segment_users(&[]).is_empty());
    }

    #[test]
    fn latest_source_is_last_by_time_then_row_order() {
        let installs = vec![
            install(Some("u1"), "meta", Some(10)),
            install(Some("u1"), "google", Some(3)),
            install(Some("u2"), "tiktok", Some(5)),
            install(Some("u2"), "organic", Some(5)),
            install(Some("u3"), "rest", None),
            install(Some("u3"), "meta", Some(1)),
            install(None, "google", Some(20)),
        ];
        let latest = latest_sources(&installs);
        assert_eq!(latest.len(), 3);
        assert_eq!(latest["u1"], "meta");
        assert_eq!(latest["u2"], "organic");
        assert_eq!(latest["u3"], "rest");
    }

    #[test]
    fn users_without_install_get_null_source_row_last() {
        let users = vec![
            UserLtv {
                user_id: "u1".to_string(),
                total_revenue: 30.0,
                ltv_tier: LtvTier::High,
            },
            UserLtv {
                user_id: "u2".to_string(),
                total_revenue: 1.0,
                ltv_tier: LtvTier::Low,
            },
            UserLtv {
                user_id: "u3".to_string(),
                total_revenue: 2.0,
                ltv_tier: LtvTier::Low,
            },
        ];
        let installs = vec![
            install(Some("u1"), "google", Some(2)),
            install(Some("u2"), "google", Some(2)),
        ];
        let latest = latest_sources(&installs);
        let rows = ltv_by_source(&users, &latest);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].source.as_deref(), Some("google"));
        assert_eq!(rows[0].ltv_tier, LtvTier::Low);
        assert_eq!(rows[1].source.as_deref(), Some("google"));
        assert_eq!(rows[1].ltv_tier, LtvTier::High);
        assert_eq!(rows[2].source, None);
        assert_eq!(rows[2].user_count, 1);
    }
}
