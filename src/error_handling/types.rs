//! Error type definitions.
//!
//! This module defines the typed errors surfaced at module boundaries and the
//! categories used to count per-site failures.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Error types for report and site-list exports.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Error writing the output file or stream.
    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error encoding a CSV row.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The requested report is not in the history.
    #[error("no report at position {0} (history holds {1})")]
    ReportNotFound(usize, usize),
}

/// A batch was refused before any remote call was made.
///
/// Each variant names the step the operator has to complete first.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("not authenticated: sign in first (`login`, or pass --token)")]
    MissingCredential,
    #[error("the site list is empty: add sites first (`sites set <file>`)")]
    EmptySiteList,
    #[error("a batch is already running")]
    AlreadyRunning,
}

/// Failures surfaced by the batch orchestrator.
///
/// Site- and library-level failures never show up here; they are recorded in
/// the batch results instead.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The batch was rejected before it started.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The site processor broke its contract (it panicked).
    #[error("site processor failed unexpectedly on {site}: {message}")]
    ProcessorFault { site: String, message: String },
}

/// Failures reported by a credential provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The operator declined or abandoned the sign-in.
    #[error("sign-in was cancelled by the user")]
    UserCancelled,

    /// The interactive prompt could not be presented to the operator.
    #[error("the interactive sign-in prompt could not be shown")]
    PromptUnavailable,

    /// Another interactive sign-in is still pending.
    #[error("another interactive sign-in is already in progress")]
    InteractionInProgress,

    /// The token (or the grant used to renew it) has expired.
    #[error("the session has expired")]
    Expired,

    /// Any other identity platform or transport failure.
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Transport-level failure of a site connector call.
///
/// Non-success HTTP statuses are not errors; they are returned as responses.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("request failed: {0}")]
    Transport(#[from] ReqwestError),
}

impl ConnectorError {
    /// Whether the failure is transient and worth retrying.
    pub fn is_retriable(&self) -> bool {
        match self {
            ConnectorError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        }
    }
}

/// A site could not be discovered; the batch records it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SiteFailure {
    pub error_type: ErrorType,
    pub message: String,
}

impl SiteFailure {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }
}

/// Categories of failures counted during a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Credential
    SessionExpired,
    // Site discovery
    SiteUnauthorized,
    SiteForbidden,
    SiteNotFound,
    SiteThrottled,
    SiteServerError,
    SiteOtherStatus,
    SiteUnreachable,
    MalformedResponse,
    NoLibraries,
    // Library updates
    LibraryUpdateFailed,
    LibraryUpdateUnreachable,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::SessionExpired => "Session expired",
            ErrorType::SiteUnauthorized => "Unauthorized (401)",
            ErrorType::SiteForbidden => "Forbidden (403)",
            ErrorType::SiteNotFound => "Site not found (404)",
            ErrorType::SiteThrottled => "Throttled (429)",
            ErrorType::SiteServerError => "Server error (5xx)",
            ErrorType::SiteOtherStatus => "Unexpected HTTP status",
            ErrorType::SiteUnreachable => "Site unreachable",
            ErrorType::MalformedResponse => "Malformed response",
            ErrorType::NoLibraries => "No document libraries",
            ErrorType::LibraryUpdateFailed => "Library update rejected",
            ErrorType::LibraryUpdateUnreachable => "Library update request failed",
        }
    }
}
