//! Domain types shared by the processor, the orchestrator and the stores.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{DEFAULT_MAJOR_VERSION_LIMIT, DEFAULT_MINOR_VERSION_LIMIT, NO_LIBRARIES_ERROR};

/// Version retention limits applied to every document library of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionPolicy {
    /// Number of major versions to retain
    pub major_version_limit: u32,
    /// Number of minor versions to retain per major version
    pub minor_version_limit: u32,
}

impl VersionPolicy {
    pub fn new(major_version_limit: u32, minor_version_limit: u32) -> Self {
        Self {
            major_version_limit,
            minor_version_limit,
        }
    }
}

impl Default for VersionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAJOR_VERSION_LIMIT, DEFAULT_MINOR_VERSION_LIMIT)
    }
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} major versions, {} minor versions",
            self.major_version_limit, self.minor_version_limit
        )
    }
}

/// Rejected site address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSiteAddress {
    #[error("site address is empty")]
    Empty,
    #[error("site address is not an absolute http(s) URL: {0}")]
    NotAUrl(String),
}

/// Address of one target site.
///
/// Always an absolute `http`/`https` URL with surrounding whitespace removed.
/// Equality is textual; the same site may appear several times in a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteAddress(String);

impl SiteAddress {
    /// Parses and validates a site address.
    pub fn parse(raw: &str) -> Result<Self, InvalidSiteAddress> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidSiteAddress::Empty);
        }
        match url::Url::parse(trimmed) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(InvalidSiteAddress::NotAUrl(trimmed.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a REST path onto the site address.
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl FromStr for SiteAddress {
    type Err = InvalidSiteAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for SiteAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of sites to process. Order is processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteList(Vec<SiteAddress>);

impl SiteList {
    pub fn new(sites: Vec<SiteAddress>) -> Self {
        Self(sites)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiteAddress> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[SiteAddress] {
        &self.0
    }

    /// Newline-delimited rendering used by the text export.
    pub fn to_text(&self) -> String {
        self.0
            .iter()
            .map(SiteAddress::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<SiteAddress>> for SiteList {
    fn from(sites: Vec<SiteAddress>) -> Self {
        Self(sites)
    }
}

impl<'a> IntoIterator for &'a SiteList {
    type Item = &'a SiteAddress;
    type IntoIter = std::slice::Iter<'a, SiteAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Document library discovered on a site during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRef {
    pub id: String,
    pub display_name: String,
}

/// Outcome of processing one site.
///
/// Fields are private so the counting invariants hold for every instance built
/// in this crate: `configured + failed == total`, and `succeeded` is true
/// exactly when at least one library was configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResult {
    site: SiteAddress,
    succeeded: bool,
    libraries_configured: u32,
    libraries_failed: u32,
    libraries_total: u32,
    error: Option<String>,
}

impl SiteResult {
    /// Result of a reachable site whose libraries were each updated once.
    pub fn from_library_outcomes(site: SiteAddress, configured: u32, failed: u32) -> Self {
        let succeeded = configured > 0;
        Self {
            site,
            succeeded,
            libraries_configured: configured,
            libraries_failed: failed,
            libraries_total: configured + failed,
            error: (!succeeded).then(|| NO_LIBRARIES_ERROR.to_string()),
        }
    }

    /// Result of a site that could not be processed at all.
    pub fn unreachable(site: SiteAddress, error: impl Into<String>) -> Self {
        Self {
            site,
            succeeded: false,
            libraries_configured: 0,
            libraries_failed: 0,
            libraries_total: 0,
            error: Some(error.into()),
        }
    }

    pub fn site(&self) -> &SiteAddress {
        &self.site
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn libraries_configured(&self) -> u32 {
        self.libraries_configured
    }

    pub fn libraries_failed(&self) -> u32 {
        self.libraries_failed
    }

    pub fn libraries_total(&self) -> u32 {
        self.libraries_total
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Aggregate counters of a completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_sites: usize,
    pub successful_sites: usize,
    pub failed_sites: usize,
    pub total_libraries_configured: u64,
}

impl BatchSummary {
    pub fn from_results(results: &[SiteResult]) -> Self {
        let successful_sites = results.iter().filter(|r| r.succeeded()).count();
        Self {
            total_sites: results.len(),
            successful_sites,
            failed_sites: results.len() - successful_sites,
            total_libraries_configured: results
                .iter()
                .map(|r| u64::from(r.libraries_configured()))
                .sum(),
        }
    }
}

/// Report of one completed batch, as kept in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub timestamp: DateTime<Utc>,
    pub policy: VersionPolicy,
    pub results: Vec<SiteResult>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Builds a report stamped with the current time.
    pub fn new(policy: VersionPolicy, results: Vec<SiteResult>) -> Self {
        Self::with_timestamp(Utc::now(), policy, results)
    }

    pub fn with_timestamp(
        timestamp: DateTime<Utc>,
        policy: VersionPolicy,
        results: Vec<SiteResult>,
    ) -> Self {
        let summary = BatchSummary::from_results(&results);
        Self {
            timestamp,
            policy,
            results,
            summary,
        }
    }
}
