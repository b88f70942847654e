//! reqwest-backed connector.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_retry::RetryIf;

use super::{ConnectorResponse, Method, SiteConnector};
use crate::config::{HEADER_IF_MATCH, IF_MATCH_ANY, ODATA_NOMETADATA, RETRY_MAX_ATTEMPTS};
use crate::error_handling::{get_retry_strategy, is_transient_status, ConnectorError};
use crate::models::SiteAddress;

/// Failure of a single attempt; transient statuses are retried like transport errors.
enum AttemptFailure {
    Transport(ConnectorError),
    TransientStatus(ConnectorResponse),
}

impl AttemptFailure {
    fn is_retriable(&self) -> bool {
        match self {
            AttemptFailure::Transport(e) => e.is_retriable(),
            AttemptFailure::TransientStatus(_) => true,
        }
    }
}

/// Calls the SharePoint REST API over HTTPS.
///
/// Reads (`GET`) are retried with exponential backoff on transport errors,
/// throttling and 5xx responses. Updates (`PATCH`) are issued exactly once.
pub struct HttpSiteConnector {
    client: Arc<reqwest::Client>,
    retry_attempts: usize,
}

impl HttpSiteConnector {
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self {
            client,
            retry_attempts: RETRY_MAX_ATTEMPTS,
        }
    }

    /// Overrides how many times a read is retried (0 disables retries).
    pub fn with_retry_attempts(mut self, attempts: usize) -> Self {
        self.retry_attempts = attempts;
        self
    }

    async fn send_once(
        &self,
        url: &str,
        token: &str,
        method: Method,
        body: Option<&serde_json::Value>,
    ) -> Result<ConnectorResponse, ConnectorError> {
        let request = match method {
            Method::Get => self.client.get(url),
            Method::Patch => self
                .client
                .patch(url)
                .header(HEADER_IF_MATCH, IF_MATCH_ANY),
        };
        let mut request = request
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, ODATA_NOMETADATA);
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, ODATA_NOMETADATA)
                .json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        // An empty or non-JSON body (e.g. 204 after an update) is not an error
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        Ok(ConnectorResponse {
            status_ok: status.is_success(),
            status_code: status.as_u16(),
            body,
        })
    }

    async fn attempt(
        &self,
        url: &str,
        token: &str,
        method: Method,
        body: Option<&serde_json::Value>,
    ) -> Result<ConnectorResponse, AttemptFailure> {
        match self.send_once(url, token, method, body).await {
            Ok(response) if !response.status_ok && is_transient_status(response.status_code) => {
                log::debug!(
                    "{} {} returned HTTP {}, may retry",
                    method.as_str(),
                    url,
                    response.status_code
                );
                Err(AttemptFailure::TransientStatus(response))
            }
            Ok(response) => Ok(response),
            Err(e) => Err(AttemptFailure::Transport(e)),
        }
    }
}

#[async_trait]
impl SiteConnector for HttpSiteConnector {
    async fn call(
        &self,
        site: &SiteAddress,
        token: &str,
        path: &str,
        method: Method,
        body: Option<&serde_json::Value>,
    ) -> Result<ConnectorResponse, ConnectorError> {
        let url = site.join(path);
        log::debug!("{} {}", method.as_str(), url);

        let outcome = match method {
            Method::Get => {
                RetryIf::start(
                    get_retry_strategy(self.retry_attempts),
                    || self.attempt(&url, token, method, body),
                    |failure: &AttemptFailure| failure.is_retriable(),
                )
                .await
            }
            Method::Patch => self.attempt(&url, token, method, body).await,
        };

        match outcome {
            Ok(response) => Ok(response),
            Err(AttemptFailure::TransientStatus(response)) => Ok(response),
            Err(AttemptFailure::Transport(e)) => {
                log::warn!("{} {} failed: {}", method.as_str(), url, e);
                Err(e)
            }
        }
    }
}
