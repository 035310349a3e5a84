//! Price data access port trait.

use crate::domain::error::DcaError;
use crate::domain::price::PriceRecord;

pub trait PricePort {
    /// Column names as they appear in the source.
    fn columns(&self) -> Result<Vec<String>, DcaError>;

    /// All usable price records, sorted by date.
    fn fetch_prices(&self) -> Result<Vec<PriceRecord>, DcaError>;
}
