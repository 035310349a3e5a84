//! Per-month contribution and share columns.

use chrono::NaiveDate;

use super::error::DcaError;
use super::price::PriceRecord;
use super::strategy::{PerStrategy, Strategy};

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub close: f64,
    pub contributions: PerStrategy<f64>,
    pub shares: PerStrategy<f64>,
}

/// Computes what every strategy contributes in each month and how many shares
/// that buys at the month's close. Expects one record per month, sorted.
pub fn derive_records(
    monthly: &[PriceRecord],
    annual_amount: f64,
) -> Result<Vec<DerivedRecord>, DcaError> {
    monthly
        .iter()
        .map(|record| {
            if !record.close.is_finite() || record.close <= 0.0 {
                return Err(DcaError::InvalidPrice {
                    date: record.date,
                    close: record.close,
                });
            }
            let month = record.month();
            let contributions =
                PerStrategy::from_fn(|strategy| strategy.contribution(month, annual_amount));
            let shares = contributions.map(|_, amount| amount / record.close);
            Ok(DerivedRecord {
                date: record.date,
                year: record.year(),
                month,
                close: record.close,
                contributions,
                shares,
            })
        })
        .collect()
}

/// Sum of shares bought by `strategy` during `year`.
pub fn shares_bought(derived: &[DerivedRecord], year: i32, strategy: Strategy) -> f64 {
    derived
        .iter()
        .filter(|r| r.year == year)
        .map(|r| r.shares.value(strategy))
        .sum()
}
