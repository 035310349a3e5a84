//! Yearly aggregation, annual returns and relative performance.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use super::error::DcaError;
use super::ledger::{derive_records, shares_bought, DerivedRecord};
use super::price::{count_adjusted_differences, monthly_records, PriceRecord};
use super::strategy::{PerStrategy, Strategy};

pub const DEFAULT_ANNUAL_AMOUNT: f64 = 12_000.0;

/// Treatment of a year whose shares cannot be valued because the data has no
/// January close in the following year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValuation {
    /// Report a return of zero.
    #[default]
    Zero,
    /// Value the shares at nothing, giving a return of -100%.
    TotalLoss,
    /// Leave the year out of the results and the averages.
    Skip,
}

impl MissingValuation {
    pub fn as_str(self) -> &'static str {
        match self {
            MissingValuation::Zero => "zero",
            MissingValuation::TotalLoss => "total_loss",
            MissingValuation::Skip => "skip",
        }
    }
}

impl fmt::Display for MissingValuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingValuation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "zero" => Ok(MissingValuation::Zero),
            "total_loss" => Ok(MissingValuation::TotalLoss),
            "skip" => Ok(MissingValuation::Skip),
            other => Err(format!(
                "unknown missing valuation policy '{}' (expected zero, total_loss or skip)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Dollars each strategy invests per calendar year.
    pub annual_amount: f64,
    pub missing_valuation: MissingValuation,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            annual_amount: DEFAULT_ANNUAL_AMOUNT,
            missing_valuation: MissingValuation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyResult {
    pub year: i32,
    pub returns: PerStrategy<f64>,
    /// False when no following-January close existed to value the shares.
    pub valued: bool,
}

impl YearlyResult {
    pub fn annual_return(&self, strategy: Strategy) -> f64 {
        self.returns.value(strategy)
    }

    /// All-in-first-month return minus equally-invested return.
    pub fn rel_perf_first_month(&self) -> f64 {
        self.annual_return(Strategy::AllInFirstMonth) - self.annual_return(Strategy::EquallyInvested)
    }

    /// All-in-last-month return minus equally-invested return.
    pub fn rel_perf_last_month(&self) -> f64 {
        self.annual_return(Strategy::AllInLastMonth) - self.annual_return(Strategy::EquallyInvested)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub avg_rel_perf_first_month: Option<f64>,
    pub avg_rel_perf_last_month: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub config: AnalysisConfig,
    pub record_count: usize,
    pub monthly_count: usize,
    pub adjusted_differences: usize,
    pub results: Vec<YearlyResult>,
    pub summary: Summary,
}

/// First January close of `year`, if the data has one.
pub fn valuation_price(derived: &[DerivedRecord], year: i32) -> Option<f64> {
    derived
        .iter()
        .filter(|r| r.year == year && r.month == 1)
        .min_by_key(|r| r.date)
        .map(|r| r.close)
}

/// One result per distinct year, ascending. Shares bought during a year are
/// valued at the following year's January close and compared against the
/// configured annual amount.
pub fn annual_returns(derived: &[DerivedRecord], config: &AnalysisConfig) -> Vec<YearlyResult> {
    let years: BTreeSet<i32> = derived.iter().map(|r| r.year).collect();
    let mut results = Vec::with_capacity(years.len());

    for year in years {
        let next_close = valuation_price(derived, year + 1);
        if next_close.is_none() && config.missing_valuation == MissingValuation::Skip {
            debug!(year, "skipping year without following-January close");
            continue;
        }

        let returns = PerStrategy::from_fn(|strategy| match next_close {
            Some(close) => {
                let gross = shares_bought(derived, year, strategy) * close;
                gross / config.annual_amount - 1.0
            }
            None => match config.missing_valuation {
                MissingValuation::TotalLoss => -1.0,
                _ => 0.0,
            },
        });

        results.push(YearlyResult {
            year,
            returns,
            valued: next_close.is_some(),
        });
    }

    results
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn summarize(results: &[YearlyResult]) -> Summary {
    Summary {
        avg_rel_perf_first_month: mean(results.iter().map(YearlyResult::rel_perf_first_month)),
        avg_rel_perf_last_month: mean(results.iter().map(YearlyResult::rel_perf_last_month)),
    }
}

/// Runs the whole calculation over raw price records.
pub fn analyze(records: &[PriceRecord], config: &AnalysisConfig) -> Result<Analysis, DcaError> {
    if records.is_empty() {
        return Err(DcaError::NoData);
    }

    let monthly = monthly_records(records);
    if monthly.len() < records.len() {
        info!(
            records = records.len(),
            months = monthly.len(),
            "collapsed price data to first record of each month"
        );
    }

    let derived = derive_records(&monthly, config.annual_amount)?;
    let results = annual_returns(&derived, config);
    let summary = summarize(&results);

    Ok(Analysis {
        config: config.clone(),
        record_count: records.len(),
        monthly_count: monthly.len(),
        adjusted_differences: count_adjusted_differences(records),
        results,
        summary,
    })
}
