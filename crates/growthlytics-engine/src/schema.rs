//! Fixed file names and required columns of the six input tables.

use growthlytics_core::install::InstallOrigin;

/// Install times and cost dates, e.g. `05-Jan-24`.
pub const DAY_MONTH_YEAR_FORMAT: &str = "%d-%b-%y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub file_name: &'static str,
    pub required_columns: &'static [&'static str],
}

pub const INSTALLS_GOOGLE: TableSchema = TableSchema {
    name: "installs_google",
    file_name: "installs_google.csv",
    required_columns: &["install_time", "visitor_id"],
};

pub const INSTALLS_REST: TableSchema = TableSchema {
    name: "installs_rest",
    file_name: "installs_rest.csv",
    required_columns: &["install_time", "visitor_id", "media_channel"],
};

pub const INSTALLS_ORGANIC: TableSchema = TableSchema {
    name: "installs_organic",
    file_name: "installs_organic.csv",
    required_columns: &["install_time", "visitor_id"],
};

pub const MAPPING: TableSchema = TableSchema {
    name: "mapping",
    file_name: "mapping.csv",
    required_columns: &["vst_id", "id", "createdat"],
};

pub const COSTS: TableSchema = TableSchema {
    name: "costs",
    file_name: "costs.csv",
    required_columns: &["date", "media_channel", "spend"],
};

pub const REVENUES: TableSchema = TableSchema {
    name: "revenues",
    file_name: "revenues.csv",
    required_columns: &["user_id", "period", "revenue"],
};

pub fn install_schema(origin: InstallOrigin) -> &'static TableSchema {
    match origin {
        InstallOrigin::Google => &INSTALLS_GOOGLE,
        InstallOrigin::Rest => &INSTALLS_REST,
        InstallOrigin::Organic => &INSTALLS_ORGANIC,
    }
}

impl TableSchema {
    /// First required column absent from `headers`, if any.
    pub fn missing_column<'h, I>(&self, headers: I) -> Option<&'static str>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let present: Vec<&str> = headers.into_iter().map(str::trim).collect();
        self.required_columns
            .iter()
            .copied()
            .find(|column| !present.contains(column))
    }
}
