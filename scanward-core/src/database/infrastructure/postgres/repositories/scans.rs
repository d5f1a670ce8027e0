use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scanward_model::{
    HostId, OperatorId, ResultStatus, ScanId, ScanRecord, ScanStatus, TenantId,
    ToolId,
};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::database::ports::scans::{
    NewScan, ScanResultSnapshot, ScanStore, ScanSummaryRow, ScanTransaction,
};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresScanStore {
    pool: PgPool,
}

/// A scan aggregate write in progress on one pooled connection.
pub struct PostgresScanTransaction {
    tx: Transaction<'static, Postgres>,
}

impl fmt::Debug for PostgresScanTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresScanTransaction").finish_non_exhaustive()
    }
}

#[derive(Debug, FromRow)]
struct ScanRow {
    id: Uuid,
    tenant_id: Uuid,
    operator_id: Uuid,
    status: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl ScanRow {
    fn into_record(self) -> Result<ScanRecord> {
        Ok(ScanRecord {
            id: ScanId(self.id),
            tenant_id: TenantId(self.tenant_id),
            operator_id: OperatorId(self.operator_id),
            status: parse_scan_status(&self.status)?,
            started_at: self.started_at,
            ended_at: self.ended_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SummaryJoinRow {
    scan_id: Uuid,
    scan_status: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    host_id: i64,
    alias: String,
    result_status: Option<String>,
    result: Option<Value>,
}

fn parse_scan_status(raw: &str) -> Result<ScanStatus> {
    raw.parse::<ScanStatus>()
        .map_err(|e| CoreError::Database(format!("Failed to decode scan status: {e}")))
}

fn parse_result_status(raw: &str) -> Result<ResultStatus> {
    raw.parse::<ResultStatus>().map_err(|e| {
        CoreError::Database(format!("Failed to decode scan result status: {e}"))
    })
}

impl PostgresScanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ScanStore for PostgresScanStore {
    async fn begin(&self) -> Result<Box<dyn ScanTransaction>> {
        let tx = self.pool().begin().await.map_err(|e| {
            CoreError::Database(format!("Failed to start transaction: {e}"))
        })?;
        Ok(Box::new(PostgresScanTransaction { tx }))
    }

    async fn scan_summary_rows(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ScanSummaryRow>> {
        let rows = sqlx::query_as::<_, SummaryJoinRow>(
            r#"
            SELECT
                s.id AS scan_id,
                s.status AS scan_status,
                s.started_at,
                s.ended_at,
                h.id AS host_id,
                h.alias,
                r.status AS result_status,
                r.result
            FROM scans s
            JOIN scan_hosts sh ON sh.scan_id = s.id
            JOIN hosts h ON h.id = sh.host_id
            LEFT JOIN scan_results r
                ON r.scan_id = s.id AND r.host_id = h.id
            WHERE s.tenant_id = $1
            ORDER BY s.started_at DESC, h.alias, s.id, r.tool_id
            "#,
        )
        .bind(tenant_id.to_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            CoreError::Database(format!(
                "Failed to load scan summaries for tenant {tenant_id}: {e}"
            ))
        })?;

        let mut grouped: Vec<ScanSummaryRow> = Vec::new();
        let mut index: HashMap<(Uuid, i64), usize> = HashMap::new();

        for row in rows {
            let slot = match index.get(&(row.scan_id, row.host_id)).copied() {
                Some(slot) => slot,
                None => {
                    grouped.push(ScanSummaryRow {
                        scan_id: ScanId(row.scan_id),
                        host_id: HostId(row.host_id),
                        alias: row.alias.clone(),
                        status: parse_scan_status(&row.scan_status)?,
                        started_at: row.started_at,
                        ended_at: row.ended_at,
                        results: Vec::new(),
                    });
                    index.insert((row.scan_id, row.host_id), grouped.len() - 1);
                    grouped.len() - 1
                }
            };

            // LEFT JOIN yields a NULL status when the pair has no results.
            if let Some(status) = row.result_status {
                grouped[slot].results.push(ScanResultSnapshot {
                    status: parse_result_status(&status)?,
                    result: row.result,
                });
            }
        }

        debug!(
            tenant_id = %tenant_id,
            pairs = grouped.len(),
            "loaded scan summary rows"
        );
        Ok(grouped)
    }
}

#[async_trait]
impl ScanTransaction for PostgresScanTransaction {
    async fn insert_scan(&mut self, scan: &NewScan) -> Result<ScanRecord> {
        let row = sqlx::query_as::<_, ScanRow>(
            r#"
            INSERT INTO scans (tenant_id, operator_id, status)
            VALUES ($1, $2, $3)
            RETURNING id, tenant_id, operator_id, status, started_at, ended_at
            "#,
        )
        .bind(scan.tenant_id.to_uuid())
        .bind(scan.operator_id.to_uuid())
        .bind(scan.status.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| CoreError::Database(format!("Failed to insert scan: {e}")))?;

        row.into_record()
    }

    async fn list_tool_ids(&mut self) -> Result<Vec<ToolId>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM tools ORDER BY id")
                .fetch_all(&mut *self.tx)
                .await
                .map_err(|e| {
                    CoreError::Database(format!("Failed to list tools: {e}"))
                })?;

        Ok(ids.into_iter().map(ToolId).collect())
    }

    async fn insert_scan_host(
        &mut self,
        scan_id: ScanId,
        host_id: HostId,
    ) -> Result<()> {
        sqlx::query("INSERT INTO scan_hosts (scan_id, host_id) VALUES ($1, $2)")
            .bind(scan_id.to_uuid())
            .bind(host_id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                CoreError::Database(format!(
                    "Failed to link host {host_id} to scan {scan_id}: {e}"
                ))
            })?;
        Ok(())
    }

    async fn insert_scan_result(
        &mut self,
        scan_id: ScanId,
        host_id: HostId,
        tool_id: ToolId,
        status: ResultStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scan_results (scan_id, host_id, tool_id, status, result)
            VALUES ($1, $2, $3, $4, NULL)
            "#,
        )
        .bind(scan_id.to_uuid())
        .bind(host_id.get())
        .bind(tool_id.0)
        .bind(status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            CoreError::Database(format!(
                "Failed to insert result for host {host_id}, tool {tool_id}: {e}"
            ))
        })?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(|e| {
            CoreError::Database(format!("Failed to commit transaction: {e}"))
        })
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(|e| {
            CoreError::Database(format!("Failed to roll back transaction: {e}"))
        })
    }
}
