//! Progress logging utilities.

use log::info;

use crate::run::ProgressEvent;

/// Logs one progress event.
pub fn log_progress(event: &ProgressEvent) {
    info!(
        "Progress {:.0}% ({}/{}): {}",
        event.percentage,
        event.index + 1,
        event.total,
        event.site
    );
}
