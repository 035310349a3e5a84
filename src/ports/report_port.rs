//! Report generation port trait.

use std::path::Path;

use crate::domain::annual::Analysis;
use crate::domain::error::DcaError;

/// Port for writing analysis output to a file.
pub trait ReportPort {
    fn write(&self, analysis: &Analysis, output_path: &Path) -> Result<(), DcaError>;
}
