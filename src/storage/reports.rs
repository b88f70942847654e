//! Report history.
//!
//! Completed batch reports are kept newest-first and capped at
//! `REPORT_HISTORY_CAPACITY`; saving past the cap drops the oldest report.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::config::REPORT_HISTORY_CAPACITY;
use crate::error_handling::DatabaseError;
use crate::models::BatchReport;

use super::DbPool;

/// Destination of completed batch reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Prepends a report to the history, evicting the oldest beyond capacity.
    async fn save_report(&self, report: &BatchReport) -> Result<(), DatabaseError>;

    /// Reports, newest first.
    async fn list_reports(&self) -> Result<Vec<BatchReport>, DatabaseError>;
}

/// SQLite-backed report history.
#[derive(Debug, Clone)]
pub struct SqliteReportStore {
    pool: DbPool,
    capacity: usize,
}

impl SqliteReportStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            capacity: REPORT_HISTORY_CAPACITY,
        }
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Report at `index` in newest-first order (0 is the latest).
    pub async fn get_report(&self, index: usize) -> Result<Option<BatchReport>, DatabaseError> {
        let row = sqlx::query("SELECT report_json FROM reports ORDER BY id DESC LIMIT 1 OFFSET ?")
            .bind(index as i64)
            .fetch_optional(self.pool())
            .await
            .map_err(DatabaseError::SqlError)?;

        match row {
            Some(row) => {
                let raw: String = row.get("report_json");
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    pub async fn count_reports(&self) -> Result<usize, DatabaseError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM reports")
            .fetch_one(self.pool())
            .await
            .map_err(DatabaseError::SqlError)?
            .get("n");
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn save_report(&self, report: &BatchReport) -> Result<(), DatabaseError> {
        let raw = serde_json::to_string(report)?;
        let summary = &report.summary;

        let mut tx = self.pool().begin().await.map_err(DatabaseError::SqlError)?;
        sqlx::query(
            "INSERT INTO reports (timestamp_ms, total_sites, successful_sites, failed_sites, total_libraries_configured, report_json)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(report.timestamp.timestamp_millis())
        .bind(summary.total_sites as i64)
        .bind(summary.successful_sites as i64)
        .bind(summary.failed_sites as i64)
        .bind(summary.total_libraries_configured as i64)
        .bind(raw)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::SqlError)?;

        let evicted = sqlx::query(
            "DELETE FROM reports WHERE id NOT IN (
                 SELECT id FROM reports ORDER BY id DESC LIMIT ?
             )",
        )
        .bind(self.capacity as i64)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::SqlError)?
        .rows_affected();

        tx.commit().await.map_err(DatabaseError::SqlError)?;

        if evicted > 0 {
            log::debug!("Dropped {evicted} report(s) beyond the history capacity");
        }
        Ok(())
    }

    async fn list_reports(&self) -> Result<Vec<BatchReport>, DatabaseError> {
        let rows = sqlx::query("SELECT report_json FROM reports ORDER BY id DESC LIMIT ?")
            .bind(self.capacity as i64)
            .fetch_all(self.pool())
            .await
            .map_err(DatabaseError::SqlError)?;

        rows.iter()
            .map(|row| {
                let raw: String = row.get("report_json");
                serde_json::from_str(&raw).map_err(DatabaseError::from)
            })
            .collect()
    }
}
