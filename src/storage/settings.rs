//! Persisted console settings and site list.
//!
//! Both are stored as JSON values in the key/value `settings` table. Bearer
//! tokens are never written here; only the account label survives a session.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::credential::AccountInfo;
use crate::error_handling::DatabaseError;
use crate::models::{SiteList, VersionPolicy};

const CONSOLE_SETTINGS_KEY: &str = "console";
const SITE_LIST_KEY: &str = "sites";

/// Operator configuration kept between console sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSettings {
    #[serde(flatten)]
    pub policy: VersionPolicy,
    #[serde(default, rename = "tenantAddress")]
    pub tenant_url: Option<String>,
    #[serde(default, rename = "accountInfo")]
    pub account: Option<AccountInfo>,
}

async fn load_value<T: DeserializeOwned>(
    pool: &SqlitePool,
    key: &str,
) -> Result<Option<T>, DatabaseError> {
    let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::SqlError)?;

    match row {
        Some(row) => {
            let raw: String = row.get("value");
            Ok(Some(serde_json::from_str(&raw)?))
        }
        None => Ok(None),
    }
}

async fn save_value<T: Serialize>(
    pool: &SqlitePool,
    key: &str,
    value: &T,
) -> Result<(), DatabaseError> {
    let raw = serde_json::to_string(value)?;
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at_ms)
         VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET
             value=excluded.value,
             updated_at_ms=excluded.updated_at_ms",
    )
    .bind(key)
    .bind(raw)
    .bind(chrono::Utc::now().timestamp_millis())
    .execute(pool)
    .await
    .map_err(DatabaseError::SqlError)?;
    Ok(())
}

/// Loads the console settings, falling back to defaults on first use.
pub async fn load_settings(pool: &SqlitePool) -> Result<ConsoleSettings, DatabaseError> {
    Ok(load_value(pool, CONSOLE_SETTINGS_KEY)
        .await?
        .unwrap_or_default())
}

pub async fn save_settings(
    pool: &SqlitePool,
    settings: &ConsoleSettings,
) -> Result<(), DatabaseError> {
    save_value(pool, CONSOLE_SETTINGS_KEY, settings).await
}

/// Loads the site list; empty on first use.
pub async fn load_site_list(pool: &SqlitePool) -> Result<SiteList, DatabaseError> {
    Ok(load_value(pool, SITE_LIST_KEY).await?.unwrap_or_default())
}

pub async fn save_site_list(pool: &SqlitePool, sites: &SiteList) -> Result<(), DatabaseError> {
    save_value(pool, SITE_LIST_KEY, sites).await
}
