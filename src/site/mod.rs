//! Per-site processing.
//!
//! A [`SiteProcessor`] applies a [`VersionPolicy`] to every document library
//! of one site. It never fails: every failure ends up in the returned
//! [`SiteResult`].

mod processor;

use async_trait::async_trait;

use crate::credential::CredentialSession;
use crate::models::{SiteAddress, SiteResult, VersionPolicy};

pub use processor::VersioningSiteProcessor;

/// Processes one site of a batch.
#[async_trait]
pub trait SiteProcessor: Send + Sync {
    async fn process_site(
        &self,
        site: &SiteAddress,
        credential: &CredentialSession,
        policy: &VersionPolicy,
    ) -> SiteResult;
}
