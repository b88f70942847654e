//! Configuration types.
//!
//! This module defines the enums and structs used for log options and the
//! library-level configuration of a console session.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_AUTHORITY_HOST, DEFAULT_AUTHORITY_TENANT, DEFAULT_DB_PATH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, INTER_SITE_DELAY,
};
use crate::models::VersionPolicy;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Holds everything a console session needs besides the persisted settings:
/// where the database lives, how to reach the identity platform and how to
/// pace and time out remote calls.
///
/// # Examples
///
/// ```no_run
/// use library_versioning::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("./versioning.db"),
///     client_id: Some("00000000-0000-0000-0000-000000000000".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Version retention limits applied by a batch
    pub policy: VersionPolicy,

    /// Tenant root URL, e.g. `https://contoso.sharepoint.com`
    pub tenant_url: Option<String>,

    /// Application (client) id registered with the identity platform
    pub client_id: Option<String>,

    /// Identity platform host
    pub authority_host: String,

    /// Directory (tenant id, domain, or `organizations`)
    pub authority_tenant: String,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Pause between consecutive sites
    pub inter_site_delay: Duration,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// OAuth2 endpoint prefix for the configured authority, without trailing slash.
    pub fn authority_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0",
            self.authority_host.trim_end_matches('/'),
            self.authority_tenant
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: VersionPolicy::default(),
            tenant_url: None,
            client_id: None,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            authority_tenant: DEFAULT_AUTHORITY_TENANT.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            inter_site_delay: INTER_SITE_DELAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
