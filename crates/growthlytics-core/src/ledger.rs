use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::normalize::week_start;

/// A row of `revenues.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    pub user_id: Option<String>,
    pub period: Option<NaiveDateTime>,
    /// NULL for blank or non-numeric cells.
    pub revenue: Option<f64>,
}

/// A row of `costs.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Lowercased, trimmed channel; compared against install sources.
    pub media_channel: Option<String>,
    pub date: Option<NaiveDate>,
    pub spend: Option<f64>,
}

impl CostRecord {
    pub fn week(&self) -> Option<NaiveDate> {
        self.date.map(week_start)
    }
}
