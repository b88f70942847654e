//! library_versioning library: document-library version limits across SharePoint sites
//!
//! This library applies a version retention policy (major and minor version
//! limits) to every visible document library of every site in a list, one site
//! at a time, and keeps a capped history of batch reports.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use library_versioning::{
//!     ActivityLog, BatchOrchestrator, BatchOutcome, CredentialSession, HttpSiteConnector,
//!     ProcessingStats, SiteList, SqliteReportStore, StaticTokenProvider, VersionPolicy,
//!     VersioningSiteProcessor,
//! };
//! use library_versioning::storage::{init_db_pool_with_path, run_migrations};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = init_db_pool_with_path(std::path::Path::new("./library_versioning.db")).await?;
//! run_migrations(&pool).await?;
//!
//! let activity = Arc::new(ActivityLog::default());
//! let processor = Arc::new(VersioningSiteProcessor::new(
//!     Arc::new(HttpSiteConnector::new(Arc::new(reqwest::Client::new()))),
//!     activity.clone(),
//!     Arc::new(ProcessingStats::new()),
//! ));
//! let orchestrator =
//!     BatchOrchestrator::new(processor, Arc::new(SqliteReportStore::new(pool)), activity);
//!
//! let session =
//!     CredentialSession::establish(Arc::new(StaticTokenProvider::new("<token>")), vec![]).await?;
//! let sites = SiteList::new(vec!["https://contoso.sharepoint.com/sites/hr".parse()?]);
//! if let BatchOutcome::Completed(report) = orchestrator
//!     .run_batch(&sites, &VersionPolicy::new(50, 5), Some(&session))
//!     .await?
//! {
//!     println!("{} libraries configured", report.summary.total_libraries_configured);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod activity_log;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod connector;
pub mod credential;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod models;
pub mod run;
pub mod site;
pub mod storage;

// Re-export public API
pub use activity_log::{ActivityEntry, ActivityLevel, ActivityLog};
pub use config::{Config, LogFormat, LogLevel};
pub use connector::{ConnectorResponse, HttpSiteConnector, Method, SiteConnector};
pub use credential::{
    AccessToken, AccountInfo, Credential, CredentialProvider, CredentialSession,
    DeviceCodeProvider, StaticTokenProvider,
};
pub use error_handling::{BatchError, PreconditionError, ProcessingStats};
pub use models::{
    BatchReport, BatchSummary, LibraryRef, SiteAddress, SiteList, SiteResult, VersionPolicy,
};
pub use run::{Affordances, BatchOrchestrator, BatchOutcome, BatchState, ProgressEvent};
pub use site::{SiteProcessor, VersioningSiteProcessor};
pub use storage::{ReportStore, SqliteReportStore};
