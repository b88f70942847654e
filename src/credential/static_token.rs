//! Provider for a bearer token obtained out of band (flag or environment).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{AccessToken, AccountInfo, Credential, CredentialProvider};
use crate::error_handling::CredentialError;

/// Hands out one pre-issued token. It cannot be renewed: once past its
/// expiry, silent acquisition reports [`CredentialError::Expired`].
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
    expires_at: Option<DateTime<Utc>>,
    account: AccountInfo,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
            account: AccountInfo::new("bearer-token"),
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_account(mut self, account: AccountInfo) -> Self {
        self.account = account;
        self
    }

    fn access_token(&self) -> AccessToken {
        match self.expires_at {
            Some(exp) => AccessToken::with_expiry(self.token.clone(), exp),
            None => AccessToken::new(self.token.clone()),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn acquire_interactive(&self, _scopes: &[String]) -> Result<Credential, CredentialError> {
        if self.token.trim().is_empty() {
            return Err(CredentialError::Provider("empty bearer token".to_string()));
        }
        Ok(Credential {
            account: self.account.clone(),
            token: self.access_token(),
        })
    }

    async fn acquire_silent(
        &self,
        _account: &AccountInfo,
        _scopes: &[String],
    ) -> Result<AccessToken, CredentialError> {
        let token = self.access_token();
        if token.needs_refresh(Utc::now()) {
            return Err(CredentialError::Expired);
        }
        Ok(token)
    }

    async fn sign_out(&self, _account: &AccountInfo) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_token_is_rejected() {
        let provider = StaticTokenProvider::new("   ");
        assert!(matches!(
            provider.acquire_interactive(&[]).await,
            Err(CredentialError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_token_without_expiry_renews_to_itself() {
        let provider = StaticTokenProvider::new("abc");
        let credential = provider.acquire_interactive(&[]).await.unwrap();
        assert_eq!(credential.token.secret(), "abc");
        let renewed = provider
            .acquire_silent(&credential.account, &[])
            .await
            .unwrap();
        assert_eq!(renewed.secret(), "abc");
    }
}
