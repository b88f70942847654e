//! CSV export of one batch report.
//!
//! One row per site, in processing order.

use csv::Writer;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::config::REPORT_CSV_HEADER;
use crate::error_handling::ExportError;
use crate::models::BatchReport;

const STATUS_SUCCESS: &str = "Sucesso";
const STATUS_FAILURE: &str = "Falha";

/// Default file name for a report export, dated by the report's UTC day.
pub fn default_report_filename(report: &BatchReport) -> String {
    format!(
        "sharepoint-report-{}.csv",
        report.timestamp.format("%Y-%m-%d")
    )
}

/// Writes `report` as CSV into `out`. Returns the number of data rows.
pub fn write_report_csv<W: Write>(report: &BatchReport, out: W) -> Result<usize, ExportError> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(REPORT_CSV_HEADER)?;

    for result in &report.results {
        let configured = result.libraries_configured().to_string();
        let failed = result.libraries_failed().to_string();
        writer.write_record([
            result.site().as_str(),
            if result.succeeded() {
                STATUS_SUCCESS
            } else {
                STATUS_FAILURE
            },
            configured.as_str(),
            failed.as_str(),
            result.error().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(report.results.len())
}

/// Exports `report` to `output`, or to stdout when `output` is `None`.
pub fn export_report_csv(report: &BatchReport, output: Option<&Path>) -> Result<usize, ExportError> {
    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    let rows = write_report_csv(report, out)?;

    if let Some(path) = output {
        log::info!("Exported {} site row(s) to {}", rows, path.display());
    }
    Ok(rows)
}
