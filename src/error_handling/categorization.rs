//! Error categorization and retry strategy.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{ErrorType, SiteFailure};
use crate::config::{
    HTTP_STATUS_FORBIDDEN, HTTP_STATUS_NOT_FOUND, HTTP_STATUS_TOO_MANY_REQUESTS,
    HTTP_STATUS_UNAUTHORIZED, MAX_ERROR_MESSAGE_LENGTH, RETRY_BACKOFF_BASE_MS, RETRY_FACTOR,
    RETRY_MAX_ATTEMPTS, RETRY_MAX_DELAY_SECS,
};

/// Creates the exponential backoff used for discovery calls.
///
/// Yields at most `max_attempts` delays (500ms, 1s, 2s, ... capped at
/// `RETRY_MAX_DELAY_SECS`).
pub fn get_retry_strategy(max_attempts: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(RETRY_BACKOFF_BASE_MS)
        .factor(RETRY_FACTOR)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
        .take(max_attempts.min(RETRY_MAX_ATTEMPTS))
}

/// Whether a response status is transient and worth retrying.
pub fn is_transient_status(status_code: u16) -> bool {
    status_code == HTTP_STATUS_TOO_MANY_REQUESTS || (500..600).contains(&status_code)
}

/// Maps a non-success discovery status code to an error category.
pub fn categorize_status(status_code: u16) -> ErrorType {
    match status_code {
        HTTP_STATUS_UNAUTHORIZED => ErrorType::SiteUnauthorized,
        HTTP_STATUS_FORBIDDEN => ErrorType::SiteForbidden,
        HTTP_STATUS_NOT_FOUND => ErrorType::SiteNotFound,
        HTTP_STATUS_TOO_MANY_REQUESTS => ErrorType::SiteThrottled,
        500..=599 => ErrorType::SiteServerError,
        _ => ErrorType::SiteOtherStatus,
    }
}

/// Builds the failure recorded for a site whose discovery call was rejected.
pub fn site_status_failure(status_code: u16, detail: Option<&str>) -> SiteFailure {
    let error_type = categorize_status(status_code);
    let headline = match error_type {
        ErrorType::SiteUnauthorized => "unauthorized",
        ErrorType::SiteForbidden => "access denied",
        ErrorType::SiteNotFound => "site not found",
        ErrorType::SiteThrottled => "throttled by the service",
        ErrorType::SiteServerError => "service error",
        _ => "unexpected response",
    };
    let message = match detail.map(str::trim).filter(|d| !d.is_empty()) {
        Some(detail) => format!(
            "{headline} (HTTP {status_code}): {}",
            truncate_message(detail)
        ),
        None => format!("{headline} (HTTP {status_code})"),
    };
    SiteFailure::new(error_type, message)
}

/// Truncates an error message to `MAX_ERROR_MESSAGE_LENGTH` characters.
pub fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_MESSAGE_LENGTH {
        return message.to_string();
    }
    let truncated: String = message.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect();
    format!("{truncated}...")
}
