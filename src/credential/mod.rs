//! Delegated credentials.
//!
//! The batch never talks to an identity platform directly: it receives a
//! [`CredentialSession`] wrapping an injected [`CredentialProvider`], and asks
//! the session for a bearer token before each site. The session renews the
//! token silently when it is about to expire.

mod device_code;
mod static_token;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::{
    IDENTITY_SCOPES, OFFLINE_ACCESS_SCOPE, SHAREPOINT_SCOPE, TOKEN_REFRESH_SKEW_SECS,
};
use crate::error_handling::CredentialError;

pub use device_code::{DeviceCodePrompt, DeviceCodeProvider, PromptHandler};
pub use static_token::StaticTokenProvider;

/// Signed-in account, persisted between console sessions (never the token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub username: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

impl AccountInfo {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            tenant_id: None,
        }
    }
}

/// Bearer token with an optional expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// A token without a known expiry; it is never renewed.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(secret: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            expires_at: Some(expires_at),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// True when the token expires within `TOKEN_REFRESH_SKEW_SECS` of `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|exp| exp - ChronoDuration::seconds(TOKEN_REFRESH_SKEW_SECS) <= now)
            .unwrap_or(false)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of an interactive sign-in.
#[derive(Debug, Clone)]
pub struct Credential {
    pub account: AccountInfo,
    pub token: AccessToken,
}

/// Source of bearer tokens for the remote service.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Signs the operator in, prompting them if needed.
    async fn acquire_interactive(&self, scopes: &[String]) -> Result<Credential, CredentialError>;

    /// Renews a token for an already signed-in account without prompting.
    async fn acquire_silent(
        &self,
        account: &AccountInfo,
        scopes: &[String],
    ) -> Result<AccessToken, CredentialError>;

    /// Forgets any cached grant for the account.
    async fn sign_out(&self, account: &AccountInfo);
}

/// Scopes requested for a tenant's SharePoint resource, plus the identity
/// scopes needed to name the signed-in account.
pub fn sharepoint_scopes(tenant_url: &str) -> Vec<String> {
    let mut scopes = vec![format!(
        "{}/{}",
        tenant_url.trim_end_matches('/'),
        SHAREPOINT_SCOPE
    )];
    scopes.extend(IDENTITY_SCOPES.iter().map(|s| s.to_string()));
    scopes.push(OFFLINE_ACCESS_SCOPE.to_string());
    scopes
}

/// A signed-in account plus its current token.
pub struct CredentialSession {
    provider: Arc<dyn CredentialProvider>,
    account: AccountInfo,
    scopes: Vec<String>,
    token: Mutex<AccessToken>,
}

impl CredentialSession {
    /// Signs in interactively and opens a session.
    pub async fn establish(
        provider: Arc<dyn CredentialProvider>,
        scopes: Vec<String>,
    ) -> Result<Self, CredentialError> {
        let credential = provider.acquire_interactive(&scopes).await?;
        Ok(Self::from_credential(provider, credential, scopes))
    }

    pub fn from_credential(
        provider: Arc<dyn CredentialProvider>,
        credential: Credential,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            provider,
            account: credential.account,
            scopes,
            token: Mutex::new(credential.token),
        }
    }

    pub fn account(&self) -> &AccountInfo {
        &self.account
    }

    /// Returns a usable bearer token, renewing it silently when it is about to expire.
    pub async fn bearer(&self) -> Result<String, CredentialError> {
        let mut token = self.token.lock().await;
        if token.needs_refresh(Utc::now()) {
            log::debug!("Renewing token for {}", self.account.username);
            let renewed = self
                .provider
                .acquire_silent(&self.account, &self.scopes)
                .await?;
            *token = renewed;
        }
        Ok(token.secret().to_string())
    }

    /// Ends the session with the provider.
    pub async fn sign_out(self) {
        self.provider.sign_out(&self.account).await;
    }
}

impl fmt::Debug for CredentialSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSession")
            .field("account", &self.account)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}
