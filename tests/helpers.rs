// Shared test helpers for database setup, sessions and scripted site processors.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;

use library_versioning::storage::{run_migrations, DbPool};
use library_versioning::{
    BatchReport, CredentialSession, SiteAddress, SiteList, SiteProcessor, SiteResult,
    StaticTokenProvider, VersionPolicy,
};
use library_versioning::{AccessToken, AccountInfo, Credential};

/// Creates a test database pool with migrations applied.
/// Uses a single-connection in-memory database so every query sees the same data.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Arc::new(pool)
}

/// A signed-in session backed by a fixed bearer token.
#[allow(dead_code)]
pub fn test_session(token: &str) -> CredentialSession {
    let provider = StaticTokenProvider::new(token);
    CredentialSession::from_credential(
        Arc::new(provider),
        Credential {
            account: AccountInfo::new("ops@contoso.com"),
            token: AccessToken::new(token),
        },
        vec![],
    )
}

#[allow(dead_code)]
pub fn site(url: &str) -> SiteAddress {
    SiteAddress::parse(url).expect("valid test site address")
}

#[allow(dead_code)]
pub fn site_list(urls: &[&str]) -> SiteList {
    SiteList::new(urls.iter().map(|url| site(url)).collect())
}

#[allow(dead_code)]
pub fn policy() -> VersionPolicy {
    VersionPolicy::new(50, 5)
}

/// What the scripted processor returns for a site.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Scripted {
    Libraries { configured: u32, failed: u32 },
    Unreachable(&'static str),
    Panic,
}

type SiteHook = Arc<dyn Fn(&SiteAddress) + Send + Sync>;

/// Site processor that returns canned outcomes and records the order of calls.
#[allow(dead_code)]
pub struct ScriptedProcessor {
    outcomes: HashMap<String, Scripted>,
    visited: Mutex<Vec<SiteAddress>>,
    hook: Mutex<Option<SiteHook>>,
}

#[allow(dead_code)]
impl ScriptedProcessor {
    pub fn new(outcomes: &[(&str, Scripted)]) -> Self {
        Self {
            outcomes: outcomes
                .iter()
                .map(|(url, outcome)| (url.to_string(), outcome.clone()))
                .collect(),
            visited: Mutex::new(Vec::new()),
            hook: Mutex::new(None),
        }
    }

    /// Runs `hook` after each site has been processed.
    pub fn set_hook(&self, hook: impl Fn(&SiteAddress) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Arc::new(hook));
    }

    pub fn visited(&self) -> Vec<SiteAddress> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl SiteProcessor for ScriptedProcessor {
    async fn process_site(
        &self,
        site: &SiteAddress,
        _credential: &CredentialSession,
        _policy: &VersionPolicy,
    ) -> SiteResult {
        self.visited.lock().unwrap().push(site.clone());
        let outcome = self
            .outcomes
            .get(site.as_str())
            .cloned()
            .unwrap_or(Scripted::Libraries {
                configured: 1,
                failed: 0,
            });
        let result = match outcome {
            Scripted::Libraries { configured, failed } => {
                SiteResult::from_library_outcomes(site.clone(), configured, failed)
            }
            Scripted::Unreachable(error) => SiteResult::unreachable(site.clone(), error),
            Scripted::Panic => panic!("scripted processor fault"),
        };
        let hook = self.hook.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(site);
        }
        result
    }
}

/// Newest-first list of saved reports, for asserting on what the store received.
#[allow(dead_code)]
pub async fn saved_reports(store: &dyn library_versioning::ReportStore) -> Vec<BatchReport> {
    store.list_reports().await.expect("list reports")
}
