//! Progress reporting.

use std::sync::Arc;

use crate::models::SiteAddress;

/// Emitted before each site is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Zero-based position of the site in the list
    pub index: usize,
    pub total: usize,
    /// `(index + 1) / total * 100`
    pub percentage: f64,
    pub site: SiteAddress,
}

impl ProgressEvent {
    pub fn new(index: usize, total: usize, site: &SiteAddress) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            (index + 1) as f64 / total as f64 * 100.0
        };
        Self {
            index,
            total,
            percentage,
            site: site.clone(),
        }
    }
}

/// Type alias for progress callback function.
pub type ProgressCallback = Option<Arc<dyn Fn(&ProgressEvent) + Send + Sync>>;

pub(crate) fn invoke_progress_callback(callback: &ProgressCallback, event: &ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_counts_the_current_site() {
        let site = SiteAddress::parse("https://contoso.sharepoint.com/sites/a").unwrap();
        assert_eq!(ProgressEvent::new(0, 4, &site).percentage, 25.0);
        assert_eq!(ProgressEvent::new(3, 4, &site).percentage, 100.0);
        assert_eq!(ProgressEvent::new(0, 1, &site).percentage, 100.0);
    }
}
