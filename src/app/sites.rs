//! Site list parsing and validation.

use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::models::{InvalidSiteAddress, SiteAddress, SiteList};

/// Number of entries in a generated sample list.
const SAMPLE_SITE_COUNT: usize = 3;

/// SharePoint Online site collection address.
static SITE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^https://[a-zA-Z0-9-]+\.sharepoint\.com/sites/[a-zA-Z0-9_-]+/?$").ok()
});

/// Outcome of parsing a text site list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSiteList {
    pub sites: SiteList,
    /// Lines that are not absolute http(s) URLs, as written
    pub rejected: Vec<String>,
}

/// Parses one site per line.
///
/// Lines are trimmed; blank lines and `#` comments are skipped. Order and
/// duplicates are kept.
pub fn parse_site_list(text: &str) -> ParsedSiteList {
    let mut sites = Vec::new();
    let mut rejected = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match SiteAddress::parse(trimmed) {
            Ok(site) => sites.push(site),
            Err(e) => {
                warn!("Skipping site entry: {e}");
                rejected.push(trimmed.to_string());
            }
        }
    }

    ParsedSiteList {
        sites: SiteList::new(sites),
        rejected,
    }
}

/// Result of checking a site list against the SharePoint Online address pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteValidation {
    pub valid: usize,
    pub invalid: Vec<SiteAddress>,
}

impl SiteValidation {
    pub fn all_valid(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Whether `site` looks like `https://<tenant>.sharepoint.com/sites/<name>`.
pub fn is_sharepoint_site(site: &SiteAddress) -> bool {
    SITE_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(site.as_str()))
}

/// Checks every site; a mismatch is a warning, the site stays in the list.
pub fn validate_sites(sites: &SiteList) -> SiteValidation {
    let invalid: Vec<SiteAddress> = sites
        .iter()
        .filter(|site| !is_sharepoint_site(site))
        .cloned()
        .collect();
    SiteValidation {
        valid: sites.len() - invalid.len(),
        invalid,
    }
}

/// Sample site list for a tenant, for trying the console out.
pub fn sample_sites(tenant_url: &str) -> Result<SiteList, InvalidSiteAddress> {
    let tenant = tenant_url.trim().trim_end_matches('/');
    if tenant.is_empty() {
        return Err(InvalidSiteAddress::Empty);
    }
    (1..=SAMPLE_SITE_COUNT)
        .map(|n| SiteAddress::parse(&format!("{tenant}/sites/exemplo-site-{n}")))
        .collect::<Result<Vec<_>, _>>()
        .map(SiteList::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let text = "\n  https://contoso.sharepoint.com/sites/hr  \n# finance later\n\nnot a url\nhttps://contoso.sharepoint.com/sites/hr\n";
        let parsed = parse_site_list(text);
        assert_eq!(parsed.sites.len(), 2);
        assert_eq!(
            parsed.sites.as_slice()[0].as_str(),
            "https://contoso.sharepoint.com/sites/hr"
        );
        assert_eq!(parsed.rejected, vec!["not a url".to_string()]);
    }

    #[test]
    fn test_validate_sites_pattern() {
        let parsed = parse_site_list(
            "https://contoso.sharepoint.com/sites/hr\n\
             https://contoso.sharepoint.com/sites/team_b-2/\n\
             https://contoso.sharepoint.com/teams/hr\n\
             http://contoso.sharepoint.com/sites/hr\n\
             https://example.com/sites/hr",
        );
        let validation = validate_sites(&parsed.sites);
        assert_eq!(validation.valid, 2);
        assert_eq!(validation.invalid.len(), 3);
        assert!(!validation.all_valid());
    }

    #[test]
    fn test_sample_sites() {
        let sites = sample_sites("https://contoso.sharepoint.com/").unwrap();
        let urls: Vec<&str> = sites.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://contoso.sharepoint.com/sites/exemplo-site-1",
                "https://contoso.sharepoint.com/sites/exemplo-site-2",
                "https://contoso.sharepoint.com/sites/exemplo-site-3",
            ]
        );
        assert!(validate_sites(&sites).all_valid());
        assert_eq!(sample_sites("  "), Err(InvalidSiteAddress::Empty));
    }
}
