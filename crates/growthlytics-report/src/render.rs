//! Writes a [`Report`] as aligned text tables, CSV blocks, or JSON.

use std::borrow::Cow;
use std::io::Write;

use growthlytics_core::analytics::Report;
use growthlytics_core::config::OutputFormat;

use crate::error::ReportError;

pub const LTV_BANNER: &str = "✅ LTV Segmentation by Source:";
pub const REENGAGEMENT_BANNER: &str = "✅ Re-engagement Summary:";
pub const ATTRIBUTION_BANNER: &str = "✅ Weekly CAC & ROAS Metrics:";

/// One printed table. `None` cells are NULL.
#[derive(Debug, Clone)]
pub struct Section {
    pub banner: &'static str,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<Option<String>>>,
}

fn metric(value: Option<f64>) -> Option<String> {
    value.map(|v| format!("{v:.2}"))
}

/// The three report sections in print order. Attribution keeps only rows with
/// both CAC and ROAS.
pub fn sections(report: &Report) -> [Section; 3] {
    [
        Section {
            banner: LTV_BANNER,
            headers: &["source", "ltv_tier", "user_count"],
            rows: report
                .ltv_by_source
                .iter()
                .map(|row| {
                    vec![
                        row.source.clone(),
                        Some(row.ltv_tier.as_str().to_string()),
                        Some(row.user_count.to_string()),
                    ]
                })
                .collect(),
        },
        Section {
            banner: REENGAGEMENT_BANNER,
            headers: &["source", "reengaged_users", "total_users", "reengagement_rate"],
            rows: report
                .reengagement
                .iter()
                .map(|row| {
                    vec![
                        Some(row.source.clone()),
                        Some(row.reengaged_users.to_string()),
                        Some(row.total_users.to_string()),
                        metric(row.reengagement_rate),
                    ]
                })
                .collect(),
        },
        Section {
            banner: ATTRIBUTION_BANNER,
            headers: &["install_week", "source", "CAC", "ROAS"],
            rows: report
                .printable_attribution()
                .map(|row| {
                    vec![
                        Some(row.install_week.format("%Y-%m-%d").to_string()),
                        Some(row.source.clone()),
                        metric(row.cac),
                        metric(row.roas),
                    ]
                })
                .collect(),
        },
    ]
}

pub fn render<W: Write>(
    report: &Report,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Table => render_table(report, out),
        OutputFormat::Csv => render_csv(report, out),
        OutputFormat::Json => render_json(report, out),
    }
}

fn render_table<W: Write>(report: &Report, out: &mut W) -> Result<(), ReportError> {
    for section in sections(report) {
        writeln!(out)?;
        writeln!(out, "{}", section.banner)?;

        let cells: Vec<Vec<&str>> = section
            .rows
            .iter()
            .map(|row| row.iter().map(|c| c.as_deref().unwrap_or("NaN")).collect())
            .collect();
        let widths: Vec<usize> = section
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let header_line: Vec<String> = section
            .headers
            .iter()
            .zip(widths.iter().copied())
            .map(|(header, width)| format!("{header:>width$}"))
            .collect();
        writeln!(out, "{}", header_line.join("  "))?;

        if cells.is_empty() {
            writeln!(out, "(no rows)")?;
            continue;
        }
        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(widths.iter().copied())
                .map(|(cell, width)| format!("{cell:>width$}"))
                .collect();
            writeln!(out, "{}", line.join("  "))?;
        }
    }
    Ok(())
}

/// Sanitize a CSV field value against formula injection.
///
/// Channel names come straight from the input files, so a non-numeric value
/// starting with `=`, `+`, `-`, `@`, TAB, or CR gets a leading single quote.
fn sanitize_csv_field(val: &str) -> Cow<'_, str> {
    if val.starts_with(['=', '+', '-', '@', '\t', '\r']) && val.parse::<f64>().is_err() {
        Cow::Owned(format!("'{val}"))
    } else {
        Cow::Borrowed(val)
    }
}

fn render_csv<W: Write>(report: &Report, out: &mut W) -> Result<(), ReportError> {
    for section in sections(report) {
        writeln!(out, "# {}", section.banner)?;
        let mut wtr = csv::Writer::from_writer(&mut *out);
        wtr.write_record(section.headers)?;
        for row in &section.rows {
            wtr.write_record(row.iter().map(|cell| match cell.as_deref() {
                Some(value) => sanitize_csv_field(value).into_owned(),
                None => String::new(),
            }))?;
        }
        wtr.flush()?;
        drop(wtr);
        writeln!(out)?;
    }
    Ok(())
}

fn render_json<W: Write>(report: &Report, out: &mut W) -> Result<(), ReportError> {
    let printable = Report {
        attribution: report.printable_attribution().cloned().collect(),
        ..report.clone()
    };
    writeln!(out, "{}", printable.to_json()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use growthlytics_core::analytics::{AttributionRow, LtvBySourceRow, LtvTier, ReengagementRow};

    use super::*;

    fn sample_report() -> Report {
        let week = NaiveDate::from_ymd_opt(2024, 12, 30).expect("valid");
        Report {
            ltv_by_source: vec![
                LtvBySourceRow {
                    source: Some("google".to_string()),
                    ltv_tier: LtvTier::High,
                    user_count: 12,
                },
                LtvBySourceRow {
                    source: None,
                    ltv_tier: LtvTier::Low,
                    user_count: 3,
                },
            ],
            reengagement: vec![ReengagementRow {
                source: "organic".to_string(),
                reengaged_users: 0,
                total_users: 4,
                reengagement_rate: Some(0.0),
            }],
            attribution: vec![
                AttributionRow {
                    install_week: week,
                    source: "google".to_string(),
                    installs: 1,
                    revenue: 30.0,
                    spend: 15.0,
                    cac: Some(15.0),
                    roas: Some(2.0),
                },
                AttributionRow {
                    install_week: week,
                    source: "meta".to_string(),
                    installs: 0,
                    revenue: 0.0,
                    spend: 9.0,
                    cac: None,
                    roas: Some(0.0),
                },
            ],
        }
    }

    fn rendered(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        render(&sample_report(), format, &mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn table_prints_banners_in_order() {
        let text = rendered(OutputFormat::Table);
        let ltv = text.find(LTV_BANNER).expect("ltv banner");
        let reeng = text.find(REENGAGEMENT_BANNER).expect("reengagement banner");
        let attr = text.find(ATTRIBUTION_BANNER).expect("attribution banner");
        assert!(ltv < reeng && reeng < attr);
        assert!(text.starts_with('\n'));
    }

    #[test]
    fn table_drops_attribution_rows_with_null_metrics() {
        let text = rendered(OutputFormat::Table);
        let attribution = &text[text.find(ATTRIBUTION_BANNER).expect("banner")..];
        assert!(attribution.contains("15.00"));
        assert!(attribution.contains("2.00"));
        assert!(!attribution.contains("meta"));
    }

    #[test]
    fn table_shows_zero_rate_and_null_source() {
        let text = rendered(OutputFormat::Table);
        assert!(text.contains("0.00"));
        assert!(text.contains("NaN"));
    }

    #[test]
    fn csv_blocks_have_headers_and_empty_nulls() {
        let text = rendered(OutputFormat::Csv);
        assert!(text.contains("source,ltv_tier,user_count\n"));
        assert!(text.contains(",Low,3\n"));
        assert!(text.contains("install_week,source,CAC,ROAS\n2024-12-30,google,15.00,2.00\n"));
    }

    #[test]
    fn csv_fields_are_sanitized() {
        assert_eq!(sanitize_csv_field("=cmd()"), "'=cmd()");
        assert_eq!(sanitize_csv_field("google"), "google");
        assert_eq!(sanitize_csv_field("-1.25"), "-1.25");
    }

    #[test]
    fn json_contains_only_printable_attribution() {
        let text = rendered(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["attribution"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["ltv_by_source"][1]["source"], serde_json::Value::Null);
    }
}
