//! Report output port trait.

use std::path::Path;

use crate::domain::error::TradeSignalError;
use crate::domain::report::BacktestReport;

/// Port for writing optimization reports.
pub trait ReportPort {
    /// Writes to `output_path`, or to stdout when `None`.
    fn write(
        &self,
        report: &BacktestReport,
        output_path: Option<&Path>,
    ) -> Result<(), TradeSignalError>;
}
