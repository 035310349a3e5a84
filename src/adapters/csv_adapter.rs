//! CSV price file adapter.
//!
//! Reads Yahoo-Finance-style exports (`Date,Open,High,Low,Close,Adj Close,Volume`).
//! Columns are located by header name, so order and extra columns do not
//! matter. Only `Date` and `Close` are required.

use crate::domain::error::DcaError;
use crate::domain::price::PriceRecord;
use crate::ports::price_port::PricePort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    path: PathBuf,
    date_format: Option<String>,
}

impl CsvAdapter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            date_format: None,
        }
    }

    /// Parse dates with exactly this chrono format instead of guessing.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> Result<csv::Reader<File>, DcaError> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DcaError::DataRead {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    let wanted = normalize_header(name);
    headers.iter().position(|h| normalize_header(h) == wanted)
}

fn require_column(headers: &csv::StringRecord, name: &str) -> Result<usize, DcaError> {
    column_index(headers, name).ok_or_else(|| DcaError::MissingColumn {
        column: name.to_string(),
    })
}

/// Parses a date string, trying the explicit format if given and otherwise
/// the common export formats plus RFC 3339 timestamps.
pub fn parse_date(raw: &str, format: Option<&str>) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if let Some(format) = format {
        return NaiveDate::parse_from_str(raw, format)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, format).map(|dt| dt.date()))
            .map_err(|e| format!("invalid date '{}' for format '{}': {}", raw, format, e));
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
    {
        return Ok(date);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    {
        return Ok(dt.date());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("unrecognised date '{}'", raw))
}

/// `Ok(None)` for the placeholders exports use for missing prices.
fn parse_price(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.replace(',', "")
        .parse::<f64>()
        .map(|v| if v.is_nan() { None } else { Some(v) })
        .map_err(|e| format!("invalid price '{}': {}", raw, e))
}

impl PricePort for CsvAdapter {
    fn columns(&self) -> Result<Vec<String>, DcaError> {
        let mut rdr = self.reader()?;
        let headers = rdr.headers().map_err(|e| DcaError::DataParse {
            line: 1,
            reason: format!("CSV header error: {}", e),
        })?;
        Ok(headers.iter().map(str::to_string).collect())
    }

    fn fetch_prices(&self) -> Result<Vec<PriceRecord>, DcaError> {
        let mut rdr = self.reader()?;
        let headers = rdr
            .headers()
            .map_err(|e| DcaError::DataParse {
                line: 1,
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let date_idx = require_column(&headers, "Date")?;
        let close_idx = require_column(&headers, "Close")?;
        let adj_idx = column_index(&headers, "Adj Close");

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for result in rdr.records() {
            let row = result.map_err(|e| DcaError::DataParse {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            let date_str = row.get(date_idx).ok_or_else(|| DcaError::DataParse {
                line,
                reason: "missing date value".into(),
            })?;
            let date = parse_date(date_str, self.date_format.as_deref())
                .map_err(|reason| DcaError::DataParse { line, reason })?;

            let close = parse_price(row.get(close_idx).unwrap_or(""))
                .map_err(|reason| DcaError::DataParse { line, reason })?;
            let Some(close) = close else {
                warn!(line, %date, "skipping row without close price");
                skipped += 1;
                continue;
            };

            let adj_close = adj_idx
                .and_then(|i| row.get(i))
                .map(parse_price)
                .transpose()
                .map_err(|reason| DcaError::DataParse { line, reason })?
                .flatten();

            records.push(PriceRecord {
                date,
                close,
                adj_close,
            });
        }

        debug!(
            path = %self.path.display(),
            records = records.len(),
            skipped,
            "loaded price file"
        );

        records.sort_by_key(|r| r.date);
        Ok(records)
    }
}
