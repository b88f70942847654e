//! Remote calls against one site.
//!
//! A [`SiteConnector`] performs exactly one logical call and reports the HTTP
//! outcome; it never interprets the payload. The REST paths and the update
//! body used by the site processor live in [`commands`].

pub mod commands;
mod http;

use async_trait::async_trait;

use crate::error_handling::ConnectorError;
use crate::models::SiteAddress;

pub use http::HttpSiteConnector;

/// HTTP methods used against the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Patch => "PATCH",
        }
    }
}

/// Outcome of one remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorResponse {
    pub status_ok: bool,
    pub status_code: u16,
    /// JSON body, when the response carried one
    pub body: Option<serde_json::Value>,
}

impl ConnectorResponse {
    /// Human-readable error text carried by a rejected call, if any.
    pub fn error_detail(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        body.pointer("/error/message/value")
            .or_else(|| body.pointer("/error/message"))
            .or_else(|| body.pointer("/odata.error/message/value"))
            .or_else(|| body.pointer("/error_description"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Performs remote calls on behalf of the site processor.
#[async_trait]
pub trait SiteConnector: Send + Sync {
    /// Issues `method` on `path` relative to `site`, authenticated with `token`.
    ///
    /// Non-success statuses are returned as responses with `status_ok == false`;
    /// only transport failures are errors.
    async fn call(
        &self,
        site: &SiteAddress,
        token: &str,
        path: &str,
        method: Method,
        body: Option<&serde_json::Value>,
    ) -> Result<ConnectorResponse, ConnectorError>;
}
