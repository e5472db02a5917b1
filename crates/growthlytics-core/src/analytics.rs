//! Pipeline inputs, report rows, and the table-source abstraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::install::{IdentityMapping, InstallEvent};
use crate::ledger::{CostRecord, RevenueRecord};

/// The six input tables, as parsed.
#[derive(Debug, Clone, Default)]
pub struct InputTables {
    pub installs_google: Vec<InstallEvent>,
    pub installs_rest: Vec<InstallEvent>,
    pub installs_organic: Vec<InstallEvent>,
    pub mapping: Vec<IdentityMapping>,
    pub costs: Vec<CostRecord>,
    pub revenues: Vec<RevenueRecord>,
}

impl InputTables {
    pub fn install_count(&self) -> usize {
        self.installs_google.len() + self.installs_rest.len() + self.installs_organic.len()
    }
}

/// Anything that can produce the input tables for one run.
pub trait TableSource {
    fn read_tables(&self) -> anyhow::Result<InputTables>;
}

/// Tertile bucket of a user's total revenue. Ordered Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LtvTier {
    Low,
    Medium,
    High,
}

impl LtvTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLtv {
    pub user_id: String,
    pub total_revenue: f64,
    pub ltv_tier: LtvTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LtvBySourceRow {
    /// NULL for users whose latest install could not be resolved.
    pub source: Option<String>,
    pub ltv_tier: LtvTier,
    pub user_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReengagementRow {
    pub source: String,
    pub reengaged_users: i64,
    pub total_users: i64,
    /// NULL when the source has no resolved users at all.
    pub reengagement_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionRow {
    pub install_week: NaiveDate,
    pub source: String,
    pub installs: i64,
    pub revenue: f64,
    pub spend: f64,
    #[serde(rename = "CAC")]
    pub cac: Option<f64>,
    #[serde(rename = "ROAS")]
    pub roas: Option<f64>,
}

impl AttributionRow {
    pub fn has_metrics(&self) -> bool {
        self.cac.is_some() && self.roas.is_some()
    }
}

/// The three output tables of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub ltv_by_source: Vec<LtvBySourceRow>,
    pub reengagement: Vec<ReengagementRow>,
    pub attribution: Vec<AttributionRow>,
}

impl Report {
    /// Attribution rows that carry both CAC and ROAS.
    pub fn printable_attribution(&self) -> impl Iterator<Item = &AttributionRow> {
        self.attribution.iter().filter(|row| row.has_metrics())
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribution(cac: Option<f64>, roas: Option<f64>) -> AttributionRow {
        AttributionRow {
            install_week: NaiveDate::from_ymd_opt(2024, 12, 30).expect("valid"),
            source: "google".to_string(),
            installs: 1,
            revenue: 30.0,
            spend: 15.0,
            cac,
            roas,
        }
    }

    #[test]
    fn ltv_tiers_are_ordered() {
        assert!(LtvTier::Low < LtvTier::Medium);
        assert!(LtvTier::Medium < LtvTier::High);
        assert_eq!(LtvTier::Medium.as_str(), "Medium");
    }

    #[test]
    fn printable_attribution_skips_null_metrics() {
        let report = Report {
            attribution: vec![
                attribution(Some(15.0), Some(2.0)),
                attribution(None, Some(2.0)),
                attribution(Some(15.0), None),
            ],
            ..Report::default()
        };
        assert_eq!(report.printable_attribution().count(), 1);
    }

    #[test]
    fn json_uses_report_column_names() {
        let report = Report {
            attribution: vec![attribution(Some(15.0), Some(2.0))],
            ..Report::default()
        };
        let json = report.to_json().expect("json");
        assert!(json.contains("\"CAC\": 15.0"));
        assert!(json.contains("\"ROAS\": 2.0"));
        assert!(json.contains("\"install_week\": \"2024-12-30\""));
    }
}
