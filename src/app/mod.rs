//! Console application helpers.
//!
//! This module provides site-list parsing and validation, progress logging,
//! Ctrl-C handling, and statistics and report printing used by the binary.

pub mod logging;
pub mod shutdown;
pub mod sites;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use shutdown::{shutdown_gracefully, spawn_stop_handler, StopConfirmation, StopDecision};
pub use sites::{
    is_sharepoint_site, parse_site_list, sample_sites, validate_sites, ParsedSiteList,
    SiteValidation,
};
pub use statistics::{
    format_report_details, format_report_list, print_batch_summary, print_error_statistics,
};
