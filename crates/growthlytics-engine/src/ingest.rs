//! Table readers. Each accepts any `io::Read` so tests can feed in-memory CSV.

use std::io;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use growthlytics_core::install::{IdentityMapping, InstallEvent, InstallOrigin};
use growthlytics_core::ledger::{CostRecord, RevenueRecord};
use growthlytics_core::normalize::{normalize_id, normalize_source, rest_source};

use crate::error::IngestError;
use crate::parse::{parse_amount, parse_cost_date, parse_datetime_lenient, parse_install_time};
use crate::schema::{install_schema, TableSchema, COSTS, MAPPING, REVENUES};

#[derive(Debug, Deserialize)]
struct RawInstall {
    install_time: Option<String>,
    visitor_id: Option<String>,
    #[serde(default)]
    media_channel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMapping {
    vst_id: Option<String>,
    id: Option<String>,
    createdat: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCost {
    date: Option<String>,
    media_channel: Option<String>,
    spend: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRevenue {
    user_id: Option<String>,
    period: Option<String>,
    revenue: Option<String>,
}

/// Validate headers against `schema`, then deserialize every row.
fn read_rows<R, T>(schema: &TableSchema, reader: R) -> Result<Vec<T>, IngestError>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|source| IngestError::Read {
        table: schema.name,
        source,
    })?;
    if let Some(column) = schema.missing_column(headers.iter()) {
        return Err(IngestError::MissingColumn {
            table: schema.name,
            column,
        });
    }

    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row.map_err(|source| IngestError::Read {
            table: schema.name,
            source,
        })?);
    }
    Ok(rows)
}

fn id_cell(raw: Option<String>) -> Option<String> {
    raw.as_deref().and_then(normalize_id)
}

pub fn read_installs<R: io::Read>(
    origin: InstallOrigin,
    reader: R,
) -> Result<Vec<InstallEvent>, IngestError> {
    let rows: Vec<RawInstall> = read_rows(install_schema(origin), reader)?;
    Ok(rows
        .into_iter()
        .map(|row| InstallEvent {
            install_time: parse_install_time(row.install_time.as_deref()),
            source: match origin.fixed_source() {
                Some(label) => label.to_string(),
                None => rest_source(row.media_channel.as_deref()),
            },
            visitor_id: id_cell(row.visitor_id),
        })
        .collect())
}

pub fn read_mapping<R: io::Read>(reader: R) -> Result<Vec<IdentityMapping>, IngestError> {
    let rows: Vec<RawMapping> = read_rows(&MAPPING, reader)?;
    Ok(rows
        .into_iter()
        .map(|row| IdentityMapping {
            created_at: parse_datetime_lenient(row.createdat.as_deref()),
            vst_id: id_cell(row.vst_id),
            user_id: id_cell(row.id),
        })
        .collect())
}

pub fn read_costs<R: io::Read>(reader: R) -> Result<Vec<CostRecord>, IngestError> {
    let rows: Vec<RawCost> = read_rows(&COSTS, reader)?;
    Ok(rows
        .into_iter()
        .map(|row| CostRecord {
            media_channel: row
                .media_channel
                .as_deref()
                .map(normalize_source)
                .filter(|v| !v.is_empty()),
            date: parse_cost_date(row.date.as_deref()),
            spend: parse_amount(row.spend.as_deref()),
        })
        .collect())
}

pub fn read_revenues<R: io::Read>(reader: R) -> Result<Vec<RevenueRecord>, IngestError> {
    let rows: Vec<RawRevenue> = read_rows(&REVENUES, reader)?;
    Ok(rows
        .into_iter()
        .map(|row| RevenueRecord {
            period: parse_datetime_lenient(row.period.as_deref()),
            revenue: parse_amount(row.revenue.as_deref()),
            user_id: id_cell(row.user_id),
        })
        .collect())
}
