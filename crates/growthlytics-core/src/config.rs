use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::CoreError;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_REENGAGEMENT_SAMPLE: usize = 200;
pub const DEFAULT_REENGAGEMENT_SHIFT_DAYS: i64 = 40;
pub const DEFAULT_REENGAGEMENT_GAP_DAYS: i64 = 30;
/// Largest day count accepted for windows, shifts, and gaps (about 100 years).
pub const MAX_DAY_SPAN: i64 = 36_500;

fn within_day_span(days: i64) -> bool {
    (-MAX_DAY_SPAN..=MAX_DAY_SPAN).contains(&days)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: String,
    pub output: OutputFormat,
    pub pipeline: PipelineSettings,
}

/// How install timestamps are reconciled with the cost ledger's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampMode {
    /// Replace every install time with `reference_date` plus a random whole-day
    /// offset in `[0, window_days)`. Reproduces historical reports only.
    Synthetic,
    /// Shift all parsed times by one whole-day offset so the earliest install
    /// lands on `reference_date`.
    #[default]
    Aligned,
    /// Use parsed install times unchanged.
    Parsed,
}

impl FromStr for TimestampMode {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "synthetic" => Ok(Self::Synthetic),
            "aligned" => Ok(Self::Aligned),
            "parsed" => Ok(Self::Parsed),
            other => Err(CoreError::InvalidTimestampMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(CoreError::InvalidOutputFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReengagementSettings {
    /// Synthetic repeat installs drawn from the install set. 0 disables.
    pub sample_size: usize,
    pub shift_days: i64,
    /// A gap strictly greater than this many days counts as re-engagement.
    pub gap_days: i64,
}

impl Default for ReengagementSettings {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_REENGAGEMENT_SAMPLE,
            shift_days: DEFAULT_REENGAGEMENT_SHIFT_DAYS,
            gap_days: DEFAULT_REENGAGEMENT_GAP_DAYS,
        }
    }
}

/// Everything the transform stages need besides the input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Seeds the single RNG shared by timestamp resynthesis and sampling.
    pub seed: u64,
    pub timestamp_mode: TimestampMode,
    pub reference_date: NaiveDate,
    pub window_days: u32,
    pub reengagement: ReengagementSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            timestamp_mode: TimestampMode::default(),
            reference_date: default_reference_date(),
            window_days: DEFAULT_WINDOW_DAYS,
            reengagement: ReengagementSettings::default(),
        }
    }
}

/// First day of the cost ledger's window.
pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 30).unwrap_or_default()
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            data_dir: std::env::var("GROWTHLYTICS_DATA_DIR").unwrap_or_else(|_| ".".to_string()),
            output: std::env::var("GROWTHLYTICS_OUTPUT")
                .unwrap_or_else(|_| "table".to_string())
                .parse()
                .map_err(|e: CoreError| e.to_string())?,
            pipeline: PipelineSettings {
                seed: std::env::var("GROWTHLYTICS_SEED")
                    .unwrap_or_else(|_| DEFAULT_SEED.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_SEED),
                timestamp_mode: std::env::var("GROWTHLYTICS_TIMESTAMP_MODE")
                    .unwrap_or_else(|_| "aligned".to_string())
                    .parse()
                    .map_err(|e: CoreError| e.to_string())?,
                reference_date: match std::env::var("GROWTHLYTICS_REFERENCE_DATE") {
                    Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                        format!("invalid GROWTHLYTICS_REFERENCE_DATE {raw:?}: {e}")
                    })?,
                    Err(_) => default_reference_date(),
                },
                window_days: std::env::var("GROWTHLYTICS_WINDOW_DAYS")
                    .unwrap_or_else(|_| DEFAULT_WINDOW_DAYS.to_string())
                    .parse()
                    .ok()
                    .filter(|days| *days > 0 && within_day_span(i64::from(*days)))
                    .unwrap_or(DEFAULT_WINDOW_DAYS),
                reengagement: ReengagementSettings {
                    sample_size: std::env::var("GROWTHLYTICS_REENGAGEMENT_SAMPLE")
                        .unwrap_or_else(|_| DEFAULT_REENGAGEMENT_SAMPLE.to_string())
                        .parse()
                        .unwrap_or(DEFAULT_REENGAGEMENT_SAMPLE),
                    shift_days: std::env::var("GROWTHLYTICS_REENGAGEMENT_SHIFT_DAYS")
                        .unwrap_or_else(|_| DEFAULT_REENGAGEMENT_SHIFT_DAYS.to_string())
                        .parse()
                        .ok()
                        .filter(|days| within_day_span(*days))
                        .unwrap_or(DEFAULT_REENGAGEMENT_SHIFT_DAYS),
                    gap_days: std::env::var("GROWTHLYTICS_REENGAGEMENT_GAP_DAYS")
                        .unwrap_or_else(|_| DEFAULT_REENGAGEMENT_GAP_DAYS.to_string())
                        .parse()
                        .ok()
                        .filter(|days| within_day_span(*days))
                        .unwrap_or(DEFAULT_REENGAGEMENT_GAP_DAYS),
                },
            },
        })
    }
}
