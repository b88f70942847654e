//! Error handling and processing statistics.
//!
//! This module provides:
//! - Typed errors for module boundaries (preconditions, credentials, connector, database)
//! - Failure categorization of remote responses
//! - Processing statistics tracking for end-of-run reporting
//! - Retry strategy configuration for discovery calls

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_status, get_retry_strategy, is_transient_status, site_status_failure,
    truncate_message,
};
pub use stats::ProcessingStats;
pub use types::{
    BatchError, ConnectorError, CredentialError, DatabaseError, ErrorType, ExportError,
    InitializationError, PreconditionError, SiteFailure,
};
