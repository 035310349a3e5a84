//! Contribution schedules compared by the analysis.

use std::fmt;
use std::str::FromStr;

pub const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// The annual amount split evenly across all twelve months.
    EquallyInvested,
    /// The whole annual amount invested in January.
    AllInFirstMonth,
    /// The whole annual amount invested in December.
    AllInLastMonth,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::EquallyInvested,
        Strategy::AllInFirstMonth,
        Strategy::AllInLastMonth,
    ];

    /// Dollars contributed in `month` (1-12) given the annual budget.
    pub fn contribution(self, month: u32, annual_amount: f64) -> f64 {
        match self {
            Strategy::EquallyInvested => annual_amount / MONTHS_PER_YEAR,
            Strategy::AllInFirstMonth if month == 1 => annual_amount,
            Strategy::AllInLastMonth if month == 12 => annual_amount,
            _ => 0.0,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Strategy::EquallyInvested => "equally_invested",
            Strategy::AllInFirstMonth => "all_in_first_month",
            Strategy::AllInLastMonth => "all_in_last_month",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strategy::EquallyInvested => "Equally Invested",
            Strategy::AllInFirstMonth => "All in First Month",
            Strategy::AllInLastMonth => "All in Last Month",
        }
    }

    fn index(self) -> usize {
        match self {
            Strategy::EquallyInvested => 0,
            Strategy::AllInFirstMonth => 1,
            Strategy::AllInLastMonth => 2,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown strategy '{}'", s))
    }
}

/// One value per [`Strategy`], iterated in [`Strategy::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerStrategy<T> {
    values: [T; 3],
}

impl<T> PerStrategy<T> {
    pub fn from_fn(mut f: impl FnMut(Strategy) -> T) -> Self {
        Self {
            values: Strategy::ALL.map(&mut f),
        }
    }

    pub fn get(&self, strategy: Strategy) -> &T {
        &self.values[strategy.index()]
    }

    pub fn map<U>(&self, mut f: impl FnMut(Strategy, &T) -> U) -> PerStrategy<U> {
        PerStrategy::from_fn(|s| f(s, self.get(s)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Strategy, &T)> {
        Strategy::ALL.into_iter().zip(self.values.iter())
    }
}

impl<T: Copy> PerStrategy<T> {
    pub fn value(&self, strategy: Strategy) -> T {
        *self.get(strategy)
    }
}
