//! Export functionality.
//!
//! This module writes a stored batch report as CSV and the site list as
//! newline-delimited text, to a file or to stdout.

mod csv;
mod sites;

pub use self::csv::{default_report_filename, export_report_csv, write_report_csv};
pub use sites::{export_site_list, write_site_list};
