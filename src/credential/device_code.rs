//! OAuth2 device authorization grant (RFC 8628).
//!
//! The console shows a short user code and a verification address; the
//! operator completes the sign-in in any browser while the console polls the
//! token endpoint. Refresh tokens are kept in memory only and are used for
//! silent renewal during a batch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use tokio::time::Instant;

use super::{AccessToken, AccountInfo, Credential, CredentialProvider};
use crate::error_handling::CredentialError;

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";
const REFRESH_TOKEN_GRANT: &str = "refresh_token";
const SLOW_DOWN_INCREMENT: Duration = Duration::from_secs(5);

/// What the operator needs to complete the sign-in.
#[derive(Debug, Clone)]
pub struct DeviceCodePrompt {
    pub user_code: String,
    pub verification_uri: String,
    pub message: String,
}

/// Presents the prompt; returns false when it could not be shown.
pub type PromptHandler = Arc<dyn Fn(&DeviceCodePrompt) -> bool + Send + Sync>;

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default = "default_poll_interval")]
    interval: u64,
    #[serde(default)]
    message: Option<String>,
}

fn default_poll_interval() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    upn: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    tid: Option<String>,
}

/// Device-code based credential provider.
pub struct DeviceCodeProvider {
    client: Arc<reqwest::Client>,
    authority_url: String,
    client_id: String,
    prompt: PromptHandler,
    refresh_tokens: Mutex<HashMap<String, String>>,
    in_progress: AtomicBool,
}

struct InteractionGuard<'a>(&'a AtomicBool);

impl Drop for InteractionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl DeviceCodeProvider {
    /// `authority_url` is the OAuth2 endpoint prefix, e.g.
    /// `https://login.microsoftonline.com/organizations/oauth2/v2.0`.
    pub fn new(
        client: Arc<reqwest::Client>,
        authority_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            authority_url: authority_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            prompt: Arc::new(|prompt: &DeviceCodePrompt| {
                log::warn!("{}", prompt.message);
                true
            }),
            refresh_tokens: Mutex::new(HashMap::new()),
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptHandler) -> Self {
        self.prompt = prompt;
        self
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.authority_url, name)
    }

    async fn request_device_code(
        &self,
        scopes: &[String],
    ) -> Result<DeviceCodeResponse, CredentialError> {
        let scope = scopes.join(" ");
        let response = self
            .client
            .post(self.endpoint("devicecode"))
            .form(&[("client_id", self.client_id.as_str()), ("scope", scope.as_str())])
            .send()
            .await
            .map_err(provider_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = token_error_detail(response).await;
            return Err(CredentialError::Provider(format!(
                "device code request rejected (HTTP {}): {}",
                status.as_u16(),
                detail
            )));
        }
        response.json().await.map_err(provider_error)
    }

    async fn poll_for_token(
        &self,
        code: &DeviceCodeResponse,
    ) -> Result<TokenResponse, CredentialError> {
        let deadline = Instant::now() + Duration::from_secs(code.expires_in);
        let mut interval = Duration::from_secs(code.interval);

        loop {
            let response = self
                .client
                .post(self.endpoint("token"))
                .form(&[
                    ("grant_type", DEVICE_CODE_GRANT),
                    ("client_id", self.client_id.as_str()),
                    ("device_code", code.device_code.as_str()),
                ])
                .send()
                .await
                .map_err(provider_error)?;

            if response.status().is_success() {
                return response.json().await.map_err(provider_error);
            }

            let error: TokenErrorResponse = response.json().await.map_err(provider_error)?;
            match error.error.as_str() {
                "authorization_pending" => {}
                "slow_down" => interval += SLOW_DOWN_INCREMENT,
                "authorization_declined" | "access_denied" => {
                    return Err(CredentialError::UserCancelled)
                }
                "expired_token" | "code_expired" => return Err(CredentialError::Expired),
                other => {
                    return Err(CredentialError::Provider(
                        error
                            .error_description
                            .unwrap_or_else(|| other.to_string()),
                    ))
                }
            }

            if Instant::now() + interval > deadline {
                return Err(CredentialError::Expired);
            }
            tokio::time::sleep(interval).await;
        }
    }

    fn remember_refresh_token(&self, username: &str, refresh_token: Option<String>) {
        if let Some(refresh_token) = refresh_token {
            self.refresh_tokens
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(username.to_string(), refresh_token);
        }
    }
}

#[async_trait]
impl CredentialProvider for DeviceCodeProvider {
    async fn acquire_interactive(&self, scopes: &[String]) -> Result<Credential, CredentialError> {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            return Err(CredentialError::InteractionInProgress);
        }
        let _guard = InteractionGuard(&self.in_progress);

        let code = self.request_device_code(scopes).await?;
        let prompt = DeviceCodePrompt {
            message: code.message.clone().unwrap_or_else(|| {
                format!(
                    "To sign in, open {} and enter the code {}",
                    code.verification_uri, code.user_code
                )
            }),
            user_code: code.user_code.clone(),
            verification_uri: code.verification_uri.clone(),
        };
        if !(self.prompt)(&prompt) {
            return Err(CredentialError::PromptUnavailable);
        }

        let token = self.poll_for_token(&code).await?;
        let account = account_from_id_token(token.id_token.as_deref());
        self.remember_refresh_token(&account.username, token.refresh_token.clone());

        Ok(Credential {
            account,
            token: access_token_from(&token),
        })
    }

    async fn acquire_silent(
        &self,
        account: &AccountInfo,
        scopes: &[String],
    ) -> Result<AccessToken, CredentialError> {
        let refresh_token = self
            .refresh_tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&account.username)
            .cloned()
            .ok_or(CredentialError::Expired)?;

        let scope = scopes.join(" ");
        let response = self
            .client
            .post(self.endpoint("token"))
            .form(&[
                ("grant_type", REFRESH_TOKEN_GRANT),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(provider_error)?;

        if !response.status().is_success() {
            let detail = token_error_detail(response).await;
            log::warn!(
                "Silent token renewal failed for {}: {}",
                account.username,
                detail
            );
            return Err(CredentialError::Expired);
        }

        let token: TokenResponse = response.json().await.map_err(provider_error)?;
        self.remember_refresh_token(&account.username, token.refresh_token.clone());
        Ok(access_token_from(&token))
    }

    async fn sign_out(&self, account: &AccountInfo) {
        self.refresh_tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&account.username);
    }
}

fn provider_error(e: reqwest::Error) -> CredentialError {
    CredentialError::Provider(e.to_string())
}

async fn token_error_detail(response: reqwest::Response) -> String {
    match response.json::<TokenErrorResponse>().await {
        Ok(error) => error.error_description.unwrap_or(error.error),
        Err(_) => "no error description".to_string(),
    }
}

fn access_token_from(token: &TokenResponse) -> AccessToken {
    match token.expires_in {
        Some(seconds) => AccessToken::with_expiry(
            token.access_token.clone(),
            Utc::now() + chrono::Duration::seconds(seconds),
        ),
        None => AccessToken::new(token.access_token.clone()),
    }
}

/// Reads the account name out of an ID token payload. The signature is not
/// checked: the claims are only used as a display label.
fn account_from_id_token(id_token: Option<&str>) -> AccountInfo {
    let claims = id_token
        .and_then(|jwt| jwt.split('.').nth(1))
        .and_then(|payload| URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok())
        .and_then(|bytes| serde_json::from_slice::<IdTokenClaims>(&bytes).ok())
        .unwrap_or_default();

    let username = claims
        .preferred_username
        .or(claims.upn)
        .or(claims.email)
        .unwrap_or_else(|| "unknown account".to_string());
    AccountInfo {
        username,
        tenant_id: claims.tid,
    }
}
