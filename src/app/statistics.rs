//! Statistics and report printing.

use chrono::Local;
use log::info;

use crate::error_handling::ProcessingStats;
use crate::models::BatchReport;

/// Prints error statistics to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    if total_errors == 0 {
        return;
    }

    info!("Error Counts ({} total):", total_errors);
    for (error_type, count) in error_stats.non_zero() {
        info!("   {}: {}", error_type.as_str(), count);
    }
}

/// Prints a one-line summary of a completed batch.
pub fn print_batch_summary(report: &BatchReport) {
    let summary = &report.summary;
    info!(
        "✅ Processed {} site{} ({} succeeded, {} failed), {} librar{} configured",
        summary.total_sites,
        if summary.total_sites == 1 { "" } else { "s" },
        summary.successful_sites,
        summary.failed_sites,
        summary.total_libraries_configured,
        if summary.total_libraries_configured == 1 {
            "y"
        } else {
            "ies"
        }
    );
}

/// One line per stored report, newest first, numbered from 1.
pub fn format_report_list(reports: &[BatchReport]) -> Vec<String> {
    reports
        .iter()
        .enumerate()
        .map(|(i, report)| {
            let summary = &report.summary;
            format!(
                "{:>2}. {}  {} OK / {} failed  {} libraries  ({})",
                i + 1,
                report.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                summary.successful_sites,
                summary.failed_sites,
                summary.total_libraries_configured,
                report.policy
            )
        })
        .collect()
}

/// Detail view of one report: header, policy and a per-site table.
pub fn format_report_details(report: &BatchReport) -> Vec<String> {
    let width = report
        .results
        .iter()
        .map(|r| r.site().as_str().len())
        .max()
        .unwrap_or(0)
        .max("Site".len());

    let mut lines = vec![
        format!(
            "Report of {}",
            report.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        format!(
            "Policy: {} major versions, {} minor versions",
            report.policy.major_version_limit, report.policy.minor_version_limit
        ),
        format!(
            "{:<width$}  {:<7}  {:>4}  {:>6}  Error",
            "Site", "Status", "OK", "Failed"
        ),
    ];
    for result in &report.results {
        lines.push(format!(
            "{:<width$}  {:<7}  {:>4}  {:>6}  {}",
            result.site().as_str(),
            if result.succeeded() { "success" } else { "failed" },
            result.libraries_configured(),
            result.libraries_failed(),
            result.error().unwrap_or("")
        ));
    }
    lines
}
