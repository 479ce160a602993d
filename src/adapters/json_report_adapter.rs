//! JSON report adapter implementing ReportPort.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::domain::error::TradeSignalError;
use crate::domain::report::BacktestReport;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportAdapter {
    pub pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render(&self, report: &BacktestReport) -> Result<String, TradeSignalError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        report: &BacktestReport,
        output_path: Option<&Path>,
    ) -> Result<(), TradeSignalError> {
        let json = self.render(report)?;
        match output_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, json + "\n")?;
                info!(path = %path.display(), "report written");
            }
            None => {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", json)?;
            }
        }
        Ok(())
    }
}
