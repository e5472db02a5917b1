use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::normalize::week_start;

/// Which raw install table a row was read from.
///
/// Union order follows declaration order: google, rest, organic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOrigin {
    Google,
    Rest,
    Organic,
}

impl InstallOrigin {
    pub const ALL: [InstallOrigin; 3] = [Self::Google, Self::Rest, Self::Organic];

    /// Constant source label for tables that carry no channel column.
    pub fn fixed_source(self) -> Option<&'static str> {
        match self {
            Self::Google => Some("google"),
            Self::Organic => Some("organic"),
            Self::Rest => None,
        }
    }
}

/// One raw install record, already tagged with its acquisition source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallEvent {
    pub visitor_id: Option<String>,
    /// NULL when the raw `install_time` cell did not match `%d-%b-%y`.
    pub install_time: Option<NaiveDateTime>,
    /// Lowercased, trimmed channel label.
    pub source: String,
}

/// A row of `mapping.csv`: device/visitor id to stable user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityMapping {
    pub vst_id: Option<String>,
    pub user_id: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// An install after union and identity resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedInstall {
    pub visitor_id: Option<String>,
    /// NULL when the visitor had no mapping row.
    pub user_id: Option<String>,
    pub install_time: Option<NaiveDateTime>,
    pub source: String,
    /// True for repeat installs appended by the re-engagement simulation.
    #[serde(default)]
    pub synthetic: bool,
}

impl UnifiedInstall {
    pub fn install_date(&self) -> Option<NaiveDate> {
        self.install_time.map(|t| t.date())
    }

    /// Monday of the ISO week containing the install.
    pub fn install_week(&self) -> Option<NaiveDate> {
        self.install_date().map(week_start)
    }
}
