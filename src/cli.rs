//! Command-line interface definition.
//!
//! Parsing lives in the library so the binary stays a thin wrapper and the
//! argument surface can be tested directly.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, LogFormat, LogLevel, DEFAULT_DB_PATH, DEFAULT_TIMEOUT_SECS};

/// Applies document-library version limits across SharePoint sites.
#[derive(Debug, Parser)]
#[command(name = "library_versioning", version, about)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// SQLite database holding settings, the site list and report history
    #[arg(long, default_value = DEFAULT_DB_PATH, global = true)]
    pub db_path: PathBuf,

    /// Application (client) id used for device-code sign-in
    #[arg(long, env = "SPVM_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// Directory to sign in against (tenant id, domain or `organizations`)
    #[arg(long, global = true)]
    pub authority_tenant: Option<String>,

    /// Identity platform host, for national clouds
    #[arg(long, global = true)]
    pub authority_host: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_seconds: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show or change the stored configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage the site list
    #[command(subcommand)]
    Sites(SitesCommand),

    /// Sign in with a device code and remember the account
    Login,

    /// Forget the signed-in account
    Logout,

    /// Apply the version policy to every site in the list
    Run(RunArgs),

    /// Inspect and export the report history
    #[command(subcommand)]
    Reports(ReportsCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the stored configuration
    Show,
    /// Update the stored configuration
    Set(ConfigSetArgs),
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    /// Major versions to keep per library
    #[arg(long)]
    pub major: Option<u32>,
    /// Minor versions to keep per major version
    #[arg(long)]
    pub minor: Option<u32>,
    /// Tenant root URL, e.g. https://contoso.sharepoint.com
    #[arg(long)]
    pub tenant_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// Replace the site list from a file (one URL per line, `-` for stdin)
    Set {
        file: PathBuf,
    },
    /// Print the site list
    Show,
    /// Check the site list against the SharePoint Online address pattern
    Validate,
    /// Replace the site list with sample sites of the configured tenant
    Sample,
    /// Remove every site from the list
    Clear {
        /// Confirm clearing the list
        #[arg(long)]
        yes: bool,
    },
    /// Write the site list as text
    Export {
        /// Output file (defaults to sharepoint-sites-list.txt, `-` for stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Bearer token for the SharePoint resource (skips device-code sign-in)
    #[arg(long, env = "SPVM_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Major versions to keep for this run (defaults to the stored value)
    #[arg(long)]
    pub major: Option<u32>,

    /// Minor versions to keep for this run (defaults to the stored value)
    #[arg(long)]
    pub minor: Option<u32>,

    /// Seconds to wait between two sites
    #[arg(long, default_value_t = 2)]
    pub delay_secs: u64,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// List stored reports, newest first
    List,
    /// Show one report (1 is the newest)
    Show {
        index: usize,
    },
    /// Export one report as CSV (1 is the newest)
    Export {
        index: usize,
        /// Output file (defaults to sharepoint-report-<date>.csv, `-` for stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Library configuration for this invocation.
    pub fn to_config(&self) -> Config {
        let mut config = Config {
            client_id: self.client_id.clone(),
            db_path: self.db_path.clone(),
            timeout_seconds: self.timeout_seconds,
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            ..Default::default()
        };
        if let Some(host) = &self.authority_host {
            config.authority_host = host.clone();
        }
        if let Some(tenant) = &self.authority_tenant {
            config.authority_tenant = tenant.clone();
        }
        if let Command::Run(args) = &self.command {
            config.inter_site_delay = Duration::from_secs(args.delay_secs);
        }
        config
    }
}
