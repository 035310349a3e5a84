#![allow(dead_code)]

use chrono::NaiveDate;
use dcacompare::domain::error::DcaError;
pub use dcacompare::domain::price::PriceRecord;
use dcacompare::ports::price_port::PricePort;
use std::cell::Cell;
use std::io::Write;

pub struct MockPricePort {
    pub columns: Vec<String>,
    pub records: Vec<PriceRecord>,
    pub error: Option<String>,
    pub fetches: Cell<usize>,
}

impl MockPricePort {
    pub fn new(records: Vec<PriceRecord>) -> Self {
        Self {
            columns: vec!["Date".into(), "Close".into(), "Adj Close".into()],
            records,
            error: None,
            fetches: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            error: Some(reason.to_string()),
            ..Self::new(Vec::new())
        }
    }
}

impl PricePort for MockPricePort {
    fn columns(&self) -> Result<Vec<String>, DcaError> {
        Ok(self.columns.clone())
    }

    fn fetch_prices(&self) -> Result<Vec<PriceRecord>, DcaError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = &self.error {
            return Err(DcaError::DataRead {
                path: "mock".into(),
                reason: reason.clone(),
            });
        }
        Ok(self.records.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One record on the first of each month starting January of `start_year`.
pub fn monthly_series(start_year: i32, closes: &[f64]) -> Vec<PriceRecord> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let year = start_year + (i / 12) as i32;
            let month = (i % 12) as u32 + 1;
            PriceRecord {
                date: date(year, month, 1),
                close,
                adj_close: Some(close),
            }
        })
        .collect()
}

/// Renders records as a Yahoo-style CSV export.
pub fn yahoo_csv(records: &[PriceRecord]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for r in records {
        let adj = r.adj_close.map(|v| v.to_string()).unwrap_or_else(|| "null".into());
        out.push_str(&format!(
            "{},{},{},{},{},{},1000000\n",
            r.date.format("%Y-%m-%d"),
            r.close,
            r.close + 10.0,
            r.close - 10.0,
            r.close,
            adj
        ));
    }
    out
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
