//! Command handlers for the console.
//!
//! Each invocation opens the database, loads the stored settings and runs one
//! command. Nothing is kept in process-wide state.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::activity_log::ActivityLog;
use crate::app::{
    format_report_details, format_report_list, log_progress, parse_site_list, print_batch_summary,
    print_error_statistics, sample_sites, shutdown_gracefully, spawn_stop_handler,
    validate_sites,
};
use crate::cli::{Cli, Command, ConfigCommand, ConfigSetArgs, ReportsCommand, RunArgs, SitesCommand};
use crate::config::{Config, SITE_LIST_EXPORT_FILENAME, STOP_CONFIRMATION_WINDOW};
use crate::connector::HttpSiteConnector;
use crate::credential::{
    sharepoint_scopes, CredentialProvider, CredentialSession, DeviceCodePrompt,
    DeviceCodeProvider, StaticTokenProvider,
};
use crate::error_handling::{BatchError, ExportError, PreconditionError, ProcessingStats};
use crate::export::{default_report_filename, export_report_csv, export_site_list};
use crate::initialization::init_client;
use crate::models::{BatchReport, SiteList, VersionPolicy};
use crate::run::{BatchOrchestrator, BatchOutcome};
use crate::site::VersioningSiteProcessor;
use crate::storage::{
    init_db_pool_with_path, load_settings, load_site_list, run_migrations, save_settings,
    save_site_list, ConsoleSettings, DbPool, ReportStore, SqliteReportStore,
};

/// Exit code of a batch rejected by a precondition.
const EXIT_PRECONDITION: u8 = 2;
/// Exit code of a batch stopped by the operator.
const EXIT_CANCELLED: u8 = 130;

/// Runs the parsed command.
pub async fn execute(cli: Cli) -> Result<ExitCode> {
    let mut config = cli.to_config();
    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .context("Failed to initialize database pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let settings = load_settings(&pool)
        .await
        .context("Failed to load settings")?;
    config.policy = settings.policy;
    config.tenant_url = settings.tenant_url.clone();

    match cli.command {
        Command::Config(command) => config_command(&pool, settings, command).await,
        Command::Sites(command) => sites_command(&pool, &settings, command).await,
        Command::Login => login(&pool, &config, settings).await,
        Command::Logout => logout(&pool, settings).await,
        Command::Run(args) => run(pool, &config, args).await,
        Command::Reports(command) => reports_command(pool, command).await,
    }
}

async fn config_command(
    pool: &DbPool,
    mut settings: ConsoleSettings,
    command: ConfigCommand,
) -> Result<ExitCode> {
    match command {
        ConfigCommand::Show => {}
        ConfigCommand::Set(ConfigSetArgs {
            major,
            minor,
            tenant_url,
        }) => {
            if let Some(major) = major {
                settings.policy.major_version_limit = major;
            }
            if let Some(minor) = minor {
                settings.policy.minor_version_limit = minor;
            }
            if let Some(tenant_url) = tenant_url {
                let tenant_url = tenant_url.trim().trim_end_matches('/').to_string();
                url::Url::parse(&tenant_url)
                    .with_context(|| format!("Invalid tenant URL: {tenant_url}"))?;
                settings.tenant_url = Some(tenant_url);
            }
            save_settings(pool, &settings)
                .await
                .context("Failed to save settings")?;
            log::info!("Configuration saved");
        }
    }

    println!("Policy:  {}", settings.policy);
    println!(
        "Tenant:  {}",
        settings.tenant_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "Account: {}",
        settings
            .account
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("(signed out)")
    );
    Ok(ExitCode::SUCCESS)
}

fn read_site_file(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read sites from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read site list {}", file.display()))
    }
}

/// `None` means stdout; an absent flag means the default file name.
fn output_target(output: Option<PathBuf>, default_name: &str) -> Option<PathBuf> {
    match output {
        Some(path) if path.as_os_str() == "-" => None,
        Some(path) => Some(path),
        None => Some(PathBuf::from(default_name)),
    }
}

async fn sites_command(
    pool: &DbPool,
    settings: &ConsoleSettings,
    command: SitesCommand,
) -> Result<ExitCode> {
    match command {
        SitesCommand::Set { file } => {
            let parsed = parse_site_list(&read_site_file(&file)?);
            if !parsed.rejected.is_empty() {
                log::warn!(
                    "{} line(s) are not site URLs and were skipped",
                    parsed.rejected.len()
                );
            }
            save_site_list(pool, &parsed.sites)
                .await
                .context("Failed to save site list")?;
            println!("{} site(s) saved", parsed.sites.len());
        }
        SitesCommand::Show => {
            let sites = load_site_list(pool).await?;
            for site in &sites {
                println!("{site}");
            }
            log::info!("{} site(s) in the list", sites.len());
        }
        SitesCommand::Validate => {
            let sites = load_site_list(pool).await?;
            if sites.is_empty() {
                bail!("The site list is empty");
            }
            let validation = validate_sites(&sites);
            if validation.all_valid() {
                println!("All {} site(s) are valid", validation.valid);
            } else {
                println!(
                    "{} valid, {} invalid:",
                    validation.valid,
                    validation.invalid.len()
                );
                for site in &validation.invalid {
                    println!("  {site}");
                }
            }
        }
        SitesCommand::Sample => {
            let tenant = settings
                .tenant_url
                .as_deref()
                .context("Set the tenant URL first: config set --tenant-url <url>")?;
            let sites = sample_sites(tenant).context("Invalid tenant URL")?;
            save_site_list(pool, &sites).await?;
            println!("Loaded {} sample site(s)", sites.len());
        }
        SitesCommand::Clear { yes } => {
            if !yes {
                bail!("Refusing to clear the site list without --yes");
            }
            save_site_list(pool, &SiteList::default()).await?;
            println!("Site list cleared");
        }
        SitesCommand::Export { output } => {
            let sites = load_site_list(pool).await?;
            let target = output_target(output, SITE_LIST_EXPORT_FILENAME);
            export_site_list(&sites, target.as_deref())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn device_code_provider(config: &Config) -> Result<DeviceCodeProvider> {
    let client_id = config
        .client_id
        .as_deref()
        .context("No client id: pass --client-id or set SPVM_CLIENT_ID")?;
    let client = init_client(config).context("Failed to initialize HTTP client")?;
    Ok(
        DeviceCodeProvider::new(client, config.authority_url(), client_id).with_prompt(Arc::new(
            |prompt: &DeviceCodePrompt| {
                eprintln!("{}", prompt.message);
                true
            },
        )),
    )
}

async fn login(pool: &DbPool, config: &Config, mut settings: ConsoleSettings) -> Result<ExitCode> {
    let tenant = config
        .tenant_url
        .as_deref()
        .context("Set the tenant URL first: config set --tenant-url <url>")?;
    let provider: Arc<dyn CredentialProvider> = Arc::new(device_code_provider(config)?);

    let session = CredentialSession::establish(provider, sharepoint_scopes(tenant))
        .await
        .context("Sign-in failed")?;
    settings.account = Some(session.account().clone());
    save_settings(pool, &settings).await?;
    println!("Signed in as {}", session.account().username);
    Ok(ExitCode::SUCCESS)
}

async fn logout(pool: &DbPool, mut settings: ConsoleSettings) -> Result<ExitCode> {
    match settings.account.take() {
        Some(account) => {
            save_settings(pool, &settings).await?;
            println!("Signed out {}", account.username);
        }
        None => println!("No account signed in"),
    }
    Ok(ExitCode::SUCCESS)
}

/// Opens a credential session for a run: the bearer token when one was
/// given, otherwise a device-code sign-in when a client id is configured.
async fn open_session(config: &Config, token: Option<String>) -> Option<CredentialSession> {
    let scopes = config
        .tenant_url
        .as_deref()
        .map(sharepoint_scopes)
        .unwrap_or_default();

    let provider: Arc<dyn CredentialProvider> = match token {
        Some(token) => Arc::new(StaticTokenProvider::new(token)),
        None if config.client_id.is_some() && config.tenant_url.is_some() => {
            match device_code_provider(config) {
                Ok(provider) => Arc::new(provider),
                Err(e) => {
                    log::error!("{e:#}");
                    return None;
                }
            }
        }
        None => return None,
    };

    match CredentialSession::establish(provider, scopes).await {
        Ok(session) => Some(session),
        Err(e) => {
            log::error!("Sign-in failed: {e}");
            None
        }
    }
}

async fn run(pool: DbPool, config: &Config, args: RunArgs) -> Result<ExitCode> {
    let sites = load_site_list(&pool).await?;
    // An empty list is refused before any sign-in prompt
    if sites.is_empty() {
        eprintln!("library_versioning: {}", PreconditionError::EmptySiteList);
        return Ok(ExitCode::from(EXIT_PRECONDITION));
    }
    let policy = VersionPolicy::new(
        args.major.unwrap_or(config.policy.major_version_limit),
        args.minor.unwrap_or(config.policy.minor_version_limit),
    );
    let credential = open_session(config, args.token).await;

    let client = init_client(config).context("Failed to initialize HTTP client")?;
    let activity = Arc::new(ActivityLog::default());
    let stats = Arc::new(ProcessingStats::new());
    let processor = Arc::new(VersioningSiteProcessor::new(
        Arc::new(HttpSiteConnector::new(client)),
        Arc::clone(&activity),
        Arc::clone(&stats),
    ));
    let store = Arc::new(SqliteReportStore::new(pool));
    let orchestrator = Arc::new(
        BatchOrchestrator::new(processor, store, Arc::clone(&activity))
            .with_inter_site_delay(config.inter_site_delay)
            .with_progress_callback(log_progress),
    );

    let stop_handler = spawn_stop_handler(Arc::clone(&orchestrator), STOP_CONFIRMATION_WINDOW);
    let outcome = orchestrator
        .run_batch(&sites, &policy, credential.as_ref())
        .await;
    shutdown_gracefully(stop_handler);

    match outcome {
        Ok(BatchOutcome::Completed(report)) => {
            print_error_statistics(&stats);
            print_batch_summary(&report);
            for line in format_report_details(&report) {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(BatchOutcome::Cancelled { sites_completed }) => {
            println!(
                "Batch stopped after {sites_completed} of {} site(s); no report was saved",
                sites.len()
            );
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
        Err(BatchError::Precondition(e)) => {
            eprintln!("library_versioning: {e}");
            Ok(ExitCode::from(EXIT_PRECONDITION))
        }
        Err(e) => {
            print_error_statistics(&stats);
            Err(e.into())
        }
    }
}

async fn reports_command(pool: DbPool, command: ReportsCommand) -> Result<ExitCode> {
    let store = SqliteReportStore::new(pool);
    match command {
        ReportsCommand::List => {
            let reports = store.list_reports().await?;
            if reports.is_empty() {
                println!("No reports yet");
            }
            for line in format_report_list(&reports) {
                println!("{line}");
            }
        }
        ReportsCommand::Show { index } => {
            let report = report_at(&store, index).await?;
            for line in format_report_details(&report) {
                println!("{line}");
            }
        }
        ReportsCommand::Export { index, output } => {
            let report = report_at(&store, index).await?;
            let target = output_target(output, &default_report_filename(&report));
            export_report_csv(&report, target.as_deref())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Report by 1-based position, newest first.
async fn report_at(store: &SqliteReportStore, index: usize) -> Result<BatchReport> {
    let found = match index.checked_sub(1) {
        Some(position) => store.get_report(position).await?,
        None => None,
    };
    match found {
        Some(report) => Ok(report),
        None => {
            let held = store.count_reports().await?;
            Err(ExportError::ReportNotFound(index, held).into())
        }
    }
}
