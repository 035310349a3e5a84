//! Core domain types and calculations.

pub mod price;
pub mod strategy;
pub mod ledger;
pub mod annual;
pub mod config_validation;
pub mod error;
