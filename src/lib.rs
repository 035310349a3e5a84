//! dcacompare — annual returns of lump-sum versus dollar-cost-averaging
//! contribution schedules over historical index prices.
//!
//! Domain logic in [`domain`], port traits in [`ports`], concrete
//! implementations in [`adapters`], command dispatch in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
