//! Batch finalization.
//!
//! Builds the report of a completed run, writes the final report lines to the
//! activity log and hands the report to the store.

use crate::activity_log::ActivityLog;
use crate::models::{BatchReport, SiteResult, VersionPolicy};
use crate::storage::ReportStore;

/// Finalizes a completed run and returns its report.
///
/// A store failure is logged; the report is returned regardless.
pub(crate) async fn finalize_batch(
    store: &dyn ReportStore,
    activity: &ActivityLog,
    policy: &VersionPolicy,
    results: Vec<SiteResult>,
) -> BatchReport {
    let report = BatchReport::new(*policy, results);
    let summary = &report.summary;

    activity.info("=== FINAL REPORT ===");
    activity.info(format!("Sites processed: {}", summary.total_sites));
    activity.success(format!("Successful sites: {}", summary.successful_sites));
    if summary.failed_sites > 0 {
        activity.error(format!("Failed sites: {}", summary.failed_sites));
    } else {
        activity.info("Failed sites: 0");
    }
    activity.info(format!(
        "Libraries configured: {}",
        summary.total_libraries_configured
    ));
    activity.info(format!("Policy applied: {}", report.policy));

    if let Err(e) = store.save_report(&report).await {
        log::error!("Failed to store batch report: {e}");
        activity.error(format!("Report could not be saved to history: {e}"));
    }

    report
}
