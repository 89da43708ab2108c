//! Output formatting for scan results.
//!
//! Three formats share one report envelope: a styled terminal table for
//! humans, pretty JSON for machines (with a published schema, see
//! `--generate-schema`), and CSV for spreadsheets. Formatters are pure
//! string producers; writing to stdout or a file is the caller's business.

use std::collections::BTreeMap;

use anstyle::{AnsiColor, Color, Style};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScanError};
use crate::record::{ScanRecord, ServerResponse, WhoisRecord};
use crate::scanner::ScanOptions;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Output format selection, shared with the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Root structure for structured scan output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ScanReport {
    /// Tool version and schema metadata.
    pub metadata: ReportMetadata,

    /// The domain whose permutations were scanned.
    pub target: String,

    /// Options the scan ran with.
    pub options: OptionsSummary,

    /// Timing and result counters.
    pub statistics: ScanStatistics,

    /// One record per surviving candidate.
    pub results: Vec<ScanRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ReportMetadata {
    pub tool_name: String,
    pub version: String,
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct OptionsSummary {
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub ordered: bool,
    pub whois: bool,
    pub content_hash: bool,
    pub mx_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ScanStatistics {
    pub duration_ms: u64,
    pub result_count: usize,
}

impl ScanReport {
    pub fn new(
        target: impl Into<String>,
        options: &ScanOptions,
        results: Vec<ScanRecord>,
        duration_ms: u64,
    ) -> Self {
        Self {
            metadata: ReportMetadata {
                tool_name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                schema_version: SCHEMA_VERSION.to_string(),
                generated_at: Utc::now(),
            },
            target: target.into(),
            options: OptionsSummary {
                concurrency: options.concurrency,
                timeout_ms: options.timeout.as_millis() as u64,
                ordered: options.ordered,
                whois: options.whois,
                content_hash: options.content_hash,
                mx_only: options.mx_only,
            },
            statistics: ScanStatistics {
                duration_ms,
                result_count: results.len(),
            },
            results,
        }
    }

    /// JSON schema of this envelope, for downstream consumers.
    pub fn generate_json_schema() -> Result<String> {
        let schema = schemars::schema_for!(ScanReport);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

/// Uniform formatter interface.
pub trait ResultFormatter {
    fn format_report(&self, report: &ScanReport) -> Result<String>;
}

/// Pick the formatter for a CLI format selection.
pub fn create_formatter(format: OutputFormat, use_colors: bool) -> Box<dyn ResultFormatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter::new(use_colors)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

/* --------------------------------- JSON ---------------------------------- */

pub struct JsonFormatter;

impl ResultFormatter for JsonFormatter {
    fn format_report(&self, report: &ScanReport) -> Result<String> {
        let mut out = serde_json::to_string_pretty(report)?;
        out.push('\n');
        Ok(out)
    }
}

/* ---------------------------------- CSV ----------------------------------- */

pub struct CsvFormatter;

const CSV_HEADER: [&str; 19] = [
    "fqdn",
    "kind",
    "tld",
    "resolvable",
    "ip_addresses",
    "public_ips",
    "internal_ips",
    "mx_records",
    "nameservers",
    "wildcard",
    "http_status",
    "http_server",
    "registrar",
    "content_score",
    "jaro_winkler",
    "levenshtein",
    "levenshtein_normalized",
    "char_diff",
    "keyboard_proximity",
];

impl ResultFormatter for CsvFormatter {
    fn format_report(&self, report: &ScanReport) -> Result<String> {
        let mut out = String::new();
        out.push_str(&CSV_HEADER.join(","));
        out.push('\n');

        for record in &report.results {
            let (http_status, http_server) = http_columns(&record.server_response);
            let fields = [
                record.fqdn().to_string(),
                record.candidate.kind.clone(),
                record.candidate.tld.clone(),
                record.resolvable.to_string(),
                record.ip_addresses.join(";"),
                record.public_ips.join(";"),
                record.internal_ips.join(";"),
                record
                    .mx_records
                    .iter()
                    .map(|mx| format!("{}:{}", mx.priority, mx.server))
                    .collect::<Vec<_>>()
                    .join(";"),
                record.nameservers.join(";"),
                record.wildcard.to_string(),
                http_status,
                http_server,
                registrar_column(record.whois.as_ref()),
                record
                    .content_hash
                    .as_ref()
                    .map(|c| c.score.to_string())
                    .unwrap_or_default(),
                format!("{:.4}", record.fuzzy.jaro_winkler),
                record.fuzzy.levenshtein.to_string(),
                format!("{:.4}", record.fuzzy.levenshtein_normalized),
                record.fuzzy.char_diff.to_string(),
                format!("{:.4}", record.fuzzy.keyboard_proximity),
            ];
            let row: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }

        Ok(out)
    }
}

fn http_columns(response: &ServerResponse) -> (String, String) {
    match response {
        ServerResponse::Ok {
            status_code,
            server,
            ..
        } => (status_code.clone(), server.clone()),
        ServerResponse::Skipped { .. } => ("skipped".to_string(), String::new()),
        ServerResponse::Error { .. } => ("error".to_string(), String::new()),
    }
}

fn registrar_column(whois: Option<&WhoisRecord>) -> String {
    whois
        .and_then(|record| record.registrar.clone())
        .unwrap_or_default()
}

/// Quote a CSV field when it carries a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/* --------------------------------- Table ---------------------------------- */

/// Style definitions for the table renderer.
struct Styles {
    header: Style,
    fqdn: Style,
    muted: Style,
    alert: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            header: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Blue))),
            fqdn: Style::new().bold(),
            muted: Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))),
            alert: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        }
    }
}

pub struct TableFormatter {
    styles: Styles,
    use_colors: bool,
}

const TABLE_COLUMNS: [&str; 7] = ["FQDN", "KIND", "IPS", "MX", "HTTP", "JARO", "CONTENT"];

impl TableFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self {
            styles: Styles::default(),
            use_colors,
        }
    }

    fn styled(&self, text: &str, style: &Style) -> String {
        if self.use_colors {
            format!("{}{}{}", style.render(), text, style.render_reset())
        } else {
            text.to_string()
        }
    }

    fn row_cells(record: &ScanRecord) -> [String; 7] {
        let (status, _) = http_columns(&record.server_response);
        let mut fqdn = record.fqdn().to_string();
        if record.wildcard {
            fqdn.push_str(" *");
        }
        [
            fqdn,
            record.candidate.kind.clone(),
            record.ip_addresses.join(" "),
            record.mx_records.len().to_string(),
            status,
            format!("{:.3}", record.fuzzy.jaro_winkler),
            record
                .content_hash
                .as_ref()
                .map(|c| format!("{}%", c.score))
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl ResultFormatter for TableFormatter {
    fn format_report(&self, report: &ScanReport) -> Result<String> {
        let rows: Vec<[String; 7]> = report.results.iter().map(Self::row_cells).collect();

        let mut widths: Vec<usize> = TABLE_COLUMNS.iter().map(|c| c.len()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        let mut out = String::new();
        let header_cells: Vec<String> = TABLE_COLUMNS
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(&self.styled(&header_cells.join("  "), &self.styles.header));
        out.push('\n');

        for (row, record) in rows.iter().zip(&report.results) {
            let mut cells = Vec::with_capacity(row.len());
            for (i, cell) in row.iter().enumerate() {
                let width = widths[i];
                let padded = format!("{cell:<width$}");
                let styled = match i {
                    0 if record.wildcard => self.styled(&padded, &self.styles.alert),
                    0 => self.styled(&padded, &self.styles.fqdn),
                    4 if padded.trim() == "skipped" || padded.trim() == "error" => {
                        self.styled(&padded, &self.styles.muted)
                    }
                    _ => padded,
                };
                cells.push(styled);
            }
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }

        if report.results.is_empty() {
            out.push_str(&self.styled("(no resolvable candidates)", &self.styles.muted));
            out.push('\n');
        }

        Ok(out)
    }
}

/* ------------------------------- Writing ---------------------------------- */

/// Write the formatted output to `path`, or stdout when no path is given.
pub fn write_output(text: &str, path: Option<&str>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .map_err(|e| ScanError::io(path, "write", e)),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

/// Group results by permutation kind, for the summary line.
pub fn count_by_kind(results: &[ScanRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in results {
        *counts.entry(record.candidate.kind.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Candidate, MxRecord};

    fn sample_report() -> ScanReport {
        let mut record = ScanRecord::new(Candidate {
            kind: "Homoglyph".into(),
            fqdn: "examp1e.com".into(),
            tld: "com".into(),
        });
        record.resolvable = true;
        record.ip_addresses = vec!["93.184.216.34".into()];
        record.public_ips = vec!["93.184.216.34".into()];
        record.mx_records = vec![MxRecord {
            priority: 10,
            server: "mail.examp1e.com".into(),
        }];
        record.fuzzy.jaro_winkler = 0.94;

        ScanReport::new("example.com", &ScanOptions::default(), vec![record], 1234)
    }

    #[test]
    fn json_format_is_parseable_and_complete() {
        let report = sample_report();
        let text = JsonFormatter.format_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["target"], "example.com");
        assert_eq!(value["statistics"]["result_count"], 1);
        assert_eq!(value["results"][0]["fqdn"], "examp1e.com");
    }

    #[test]
    fn csv_rows_match_header_arity() {
        let report = sample_report();
        let text = CsvFormatter.format_report(&report).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert_eq!(header.split(',').count(), CSV_HEADER.len());
        let row = lines.next().unwrap();
        assert_eq!(row.split(',').count(), CSV_HEADER.len());
        assert!(row.starts_with("examp1e.com,Homoglyph"));
    }

    #[test]
    fn csv_escaping_quotes_delimiters() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn table_contains_candidate_and_header() {
        let report = sample_report();
        let text = TableFormatter::new(false).format_report(&report).unwrap();
        assert!(text.contains("FQDN"));
        assert!(text.contains("examp1e.com"));
        assert!(text.contains("0.940"));
    }

    #[test]
    fn empty_table_prints_placeholder() {
        let report = ScanReport::new("example.com", &ScanOptions::default(), Vec::new(), 5);
        let text = TableFormatter::new(false).format_report(&report).unwrap();
        assert!(text.contains("no resolvable candidates"));
    }

    #[test]
    fn schema_generation_mentions_results() {
        let schema = ScanReport::generate_json_schema().unwrap();
        assert!(schema.contains("\"results\""));
        assert!(schema.contains("ScanRecord"));
    }

    #[test]
    fn kind_counts_aggregate() {
        let report = sample_report();
        let counts = count_by_kind(&report.results);
        assert_eq!(counts.get("Homoglyph"), Some(&1));
    }
}
