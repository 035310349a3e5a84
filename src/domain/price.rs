//! Price record representation and calendar helpers.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub close: f64,
    /// Adjusted close, when the source provides one. Only used for diagnostics.
    pub adj_close: Option<f64>,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            adj_close: None,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }
}

/// Number of records whose adjusted close is present and differs from close.
///
/// A missing adjusted close is not counted: rows without one carry no
/// adjustment to compare against.
pub fn count_adjusted_differences(records: &[PriceRecord]) -> usize {
    records
        .iter()
        .filter(|r| matches!(r.adj_close, Some(adj) if adj != r.close))
        .count()
}

/// Sorts by date and keeps the first record of every (year, month).
///
/// Monthly input passes through unchanged apart from ordering; daily input is
/// reduced to the first trading day of each month.
pub fn monthly_records(records: &[PriceRecord]) -> Vec<PriceRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.date);

    let mut monthly: Vec<PriceRecord> = Vec::with_capacity(sorted.len());
    for record in sorted {
        let same_month = monthly
            .last()
            .is_some_and(|last| last.year() == record.year() && last.month() == record.month());
        if !same_month {
            monthly.push(record);
        }
    }
    monthly
}

pub fn date_range(records: &[PriceRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.date).min()?;
    let max = records.iter().map(|r| r.date).max()?;
    Some((min, max))
}
