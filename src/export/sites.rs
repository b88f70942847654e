//! Newline-delimited export of the site list.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error_handling::ExportError;
use crate::models::SiteList;

/// Writes one site address per line. Returns the number of sites written.
pub fn write_site_list<W: Write>(sites: &SiteList, mut out: W) -> Result<usize, ExportError> {
    for site in sites {
        writeln!(out, "{site}")?;
    }
    out.flush()?;
    Ok(sites.len())
}

/// Exports the site list to `output`, or to stdout when `output` is `None`.
pub fn export_site_list(sites: &SiteList, output: Option<&Path>) -> Result<usize, ExportError> {
    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    let count = write_site_list(sites, out)?;

    if let Some(path) = output {
        log::info!("Exported {} site(s) to {}", count, path.display());
    }
    Ok(count)
}
