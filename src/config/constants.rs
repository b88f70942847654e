//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including pacing, capacities, retry tuning and REST API paths.

use std::time::Duration;

// Version retention defaults
/// Major versions kept per library when the operator has not configured a limit
pub const DEFAULT_MAJOR_VERSION_LIMIT: u32 = 3;
/// Minor (draft) versions kept per major version by default
pub const DEFAULT_MINOR_VERSION_LIMIT: u32 = 1;

// Batch pacing
/// Pause between two consecutive sites.
pub const INTER_SITE_DELAY: Duration = Duration::from_secs(2);

// Capacities
/// Number of batch reports kept in history (newest first)
pub const REPORT_HISTORY_CAPACITY: usize = 10;
/// Number of entries kept by the rolling activity log
pub const ACTIVITY_LOG_CAPACITY: usize = 100;
/// Log target prefix of activity entries; the level tag follows as the last segment
pub const ACTIVITY_LOG_TARGET: &str = "library_versioning::activity";

// Storage
/// Default SQLite database path
pub const DEFAULT_DB_PATH: &str = "./library_versioning.db";

// HTTP
/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default User-Agent sent to the remote service
pub const DEFAULT_USER_AGENT: &str = concat!("library_versioning/", env!("CARGO_PKG_VERSION"));
/// Maximum error body length kept in a site error message
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 300;

// Retry strategy (discovery calls only, library updates are never retried)
/// Base of the exponential backoff; combined with `RETRY_FACTOR` gives 500ms, 1s, 2s
pub const RETRY_BACKOFF_BASE_MS: u64 = 2;
/// Multiplier applied to each backoff step
pub const RETRY_FACTOR: u64 = 250;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 10;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_UNAUTHORIZED: u16 = 401;
pub const HTTP_STATUS_FORBIDDEN: u16 = 403;
pub const HTTP_STATUS_NOT_FOUND: u16 = 404;
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

// Authentication
/// Identity platform host used for the device authorization grant
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
/// Tenant segment used when the operator has not pinned a directory
pub const DEFAULT_AUTHORITY_TENANT: &str = "organizations";
/// Tokens expiring within this window are renewed before use
pub const TOKEN_REFRESH_SKEW_SECS: i64 = 60;
/// Delegated permission requested on the tenant's SharePoint resource
pub const SHAREPOINT_SCOPE: &str = "AllSites.FullControl";
/// Scope that makes the identity platform issue a refresh token
pub const OFFLINE_ACCESS_SCOPE: &str = "offline_access";
/// Scopes that make the identity platform issue an ID token with the account name
pub const IDENTITY_SCOPES: [&str; 2] = ["openid", "profile"];

// REST API
/// Base template identifier of document libraries
pub const DOCUMENT_LIBRARY_TEMPLATE: i64 = 101;
/// Site metadata probe
pub const WEB_METADATA_PATH: &str = "_api/web?$select=Title,Url";

// Operator interaction
/// Window in which a second Ctrl-C confirms the stop request
pub const STOP_CONFIRMATION_WINDOW: Duration = Duration::from_secs(5);

// Error strings recorded in site results
pub const SESSION_EXPIRED_ERROR: &str = "session expired";
pub const NO_LIBRARIES_ERROR: &str = "no libraries processed";

// Export
/// Column headers of the report CSV export
pub const REPORT_CSV_HEADER: [&str; 5] = [
    "Site URL",
    "Status",
    "Bibliotecas OK",
    "Bibliotecas Erro",
    "Erro",
];
/// Default file name of the site list export
pub const SITE_LIST_EXPORT_FILENAME: &str = "sharepoint-sites-list.txt";
