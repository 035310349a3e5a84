//! CSV export of the yearly results table.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::annual::{Analysis, YearlyResult};
use crate::domain::error::DcaError;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Serialize)]
struct ResultRow {
    year: i32,
    equally_invested: f64,
    all_in_first_month: f64,
    all_in_last_month: f64,
    rel_perf_first_month: f64,
    rel_perf_last_month: f64,
    valued: bool,
}

impl From<&YearlyResult> for ResultRow {
    fn from(r: &YearlyResult) -> Self {
        Self {
            year: r.year,
            equally_invested: r.annual_return(Strategy::EquallyInvested),
            all_in_first_month: r.annual_return(Strategy::AllInFirstMonth),
            all_in_last_month: r.annual_return(Strategy::AllInLastMonth),
            rel_perf_first_month: r.rel_perf_first_month(),
            rel_perf_last_month: r.rel_perf_last_month(),
            valued: r.valued,
        }
    }
}

#[derive(Debug, Default)]
pub struct CsvResultsAdapter;

impl CsvResultsAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for CsvResultsAdapter {
    fn write(&self, analysis: &Analysis, output_path: &Path) -> Result<(), DcaError> {
        let report_err = |reason: String| DcaError::Report {
            path: output_path.display().to_string(),
            reason,
        };

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(output_path).map_err(|e| report_err(e.to_string()))?;
        for result in &analysis.results {
            writer
                .serialize(ResultRow::from(result))
                .map_err(|e| report_err(e.to_string()))?;
        }
        writer.flush().map_err(|e| report_err(e.to_string()))?;

        info!(
            path = %output_path.display(),
            rows = analysis.results.len(),
            "results table written"
        );
        Ok(())
    }
}
