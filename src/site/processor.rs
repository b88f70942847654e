use std::sync::Arc;

use async_trait::async_trait;

use super::SiteProcessor;
use crate::activity_log::ActivityLog;
use crate::config::SESSION_EXPIRED_ERROR;
use crate::connector::commands::{
    document_libraries_path, library_path, parse_libraries, web_metadata_path, VersioningUpdate,
};
use crate::connector::{ConnectorResponse, Method, SiteConnector};
use crate::credential::CredentialSession;
use crate::error_handling::{
    site_status_failure, truncate_message, ErrorType, ProcessingStats, SiteFailure,
};
use crate::models::{LibraryRef, SiteAddress, SiteResult, VersionPolicy};

/// Discovers the document libraries of a site and sets their versioning limits.
pub struct VersioningSiteProcessor {
    connector: Arc<dyn SiteConnector>,
    activity: Arc<ActivityLog>,
    stats: Arc<ProcessingStats>,
}

impl VersioningSiteProcessor {
    pub fn new(
        connector: Arc<dyn SiteConnector>,
        activity: Arc<ActivityLog>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            connector,
            activity,
            stats,
        }
    }

    /// Records a discovery failure and builds the zero-count result for it.
    fn unreachable(&self, site: &SiteAddress, failure: SiteFailure) -> SiteResult {
        self.stats.increment_error(failure.error_type);
        self.activity
            .error(format!("Site {} failed: {}", site, failure.message));
        SiteResult::unreachable(site.clone(), failure.message)
    }

    /// GET with discovery error mapping.
    async fn discover(
        &self,
        site: &SiteAddress,
        token: &str,
        path: &str,
    ) -> Result<serde_json::Value, SiteFailure> {
        let response = self
            .connector
            .call(site, token, path, Method::Get, None)
            .await
            .map_err(|e| {
                SiteFailure::new(
                    ErrorType::SiteUnreachable,
                    format!("site unreachable: {}", truncate_message(&e.to_string())),
                )
            })?;

        if !response.status_ok {
            return Err(site_status_failure(
                response.status_code,
                response.error_detail().as_deref(),
            ));
        }
        response.body.ok_or_else(|| {
            SiteFailure::new(
                ErrorType::MalformedResponse,
                format!("malformed response: empty body from {path}"),
            )
        })
    }

    async fn discover_libraries(
        &self,
        site: &SiteAddress,
        token: &str,
    ) -> Result<Vec<LibraryRef>, SiteFailure> {
        let web = self.discover(site, token, web_metadata_path()).await?;
        if let Some(title) = web.get("Title").and_then(|t| t.as_str()) {
            log::debug!("Site {site} is titled '{title}'");
        }

        let listing = self
            .discover(site, token, &document_libraries_path())
            .await?;
        parse_libraries(&listing).map_err(|e| {
            SiteFailure::new(
                ErrorType::MalformedResponse,
                format!("malformed response: {e}"),
            )
        })
    }

    /// Applies the policy to one library. Returns true when the update was accepted.
    async fn configure_library(
        &self,
        site: &SiteAddress,
        token: &str,
        library: &LibraryRef,
        update: &serde_json::Value,
    ) -> bool {
        let outcome = self
            .connector
            .call(
                site,
                token,
                &library_path(&library.id),
                Method::Patch,
                Some(update),
            )
            .await;

        match outcome {
            Ok(ConnectorResponse { status_ok: true, .. }) => {
                self.activity
                    .success(format!("Library '{}' configured", library.display_name));
                true
            }
            Ok(response) => {
                self.stats.increment_error(ErrorType::LibraryUpdateFailed);
                let detail = response
                    .error_detail()
                    .map(|d| format!(": {}", truncate_message(&d)))
                    .unwrap_or_default();
                self.activity.warning(format!(
                    "Library '{}' not configured (HTTP {}){}",
                    library.display_name, response.status_code, detail
                ));
                false
            }
            Err(e) => {
                self.stats.increment_error(ErrorType::LibraryUpdateUnreachable);
                self.activity.warning(format!(
                    "Library '{}' not configured: {}",
                    library.display_name, e
                ));
                false
            }
        }
    }
}

#[async_trait]
impl SiteProcessor for VersioningSiteProcessor {
    async fn process_site(
        &self,
        site: &SiteAddress,
        credential: &CredentialSession,
        policy: &VersionPolicy,
    ) -> SiteResult {
        let token = match credential.bearer().await {
            Ok(token) => token,
            Err(e) => {
                log::warn!("Token unavailable for {site}: {e}");
                return self.unreachable(
                    site,
                    SiteFailure::new(ErrorType::SessionExpired, SESSION_EXPIRED_ERROR),
                );
            }
        };

        self.activity.info(format!("Connecting to site {site}"));
        let libraries = match self.discover_libraries(site, &token).await {
            Ok(libraries) => libraries,
            Err(failure) => return self.unreachable(site, failure),
        };
        self.activity
            .info(format!("Found {} document libraries", libraries.len()));

        let update = VersioningUpdate::from(policy).to_json();
        let mut configured = 0u32;
        let mut failed = 0u32;
        for library in &libraries {
            if self.configure_library(site, &token, library, &update).await {
                configured += 1;
            } else {
                failed += 1;
            }
        }
        self.activity.info(format!("Disconnected from site {site}"));

        let result = SiteResult::from_library_outcomes(site.clone(), configured, failed);
        if !result.succeeded() {
            self.stats.increment_error(ErrorType::NoLibraries);
        }
        result
    }
}
