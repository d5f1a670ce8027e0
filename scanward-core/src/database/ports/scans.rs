use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scanward_model::{
    HostId, OperatorId, ResultStatus, ScanId, ScanRecord, ScanStatus, TenantId,
    ToolId,
};
use serde_json::Value;

use crate::Result;

/// Values for a new `scans` row; the ID and start time are assigned by
/// storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScan {
    pub tenant_id: TenantId,
    pub operator_id: OperatorId,
    pub status: ScanStatus,
}

/// Status and document of one `scan_results` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResultSnapshot {
    pub status: ResultStatus,
    pub result: Option<Value>,
}

/// One (scan, host) pair of a tenant together with all its tool results.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummaryRow {
    pub scan_id: ScanId,
    pub host_id: HostId,
    pub alias: String,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub results: Vec<ScanResultSnapshot>,
}

#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Open a transaction. Nothing written through it is visible until
    /// [`ScanTransaction::commit`].
    async fn begin(&self) -> Result<Box<dyn ScanTransaction>>;

    async fn scan_summary_rows(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ScanSummaryRow>>;
}

/// Write half of a scan aggregate. Dropping it without committing discards
/// every write.
#[async_trait]
pub trait ScanTransaction: Send {
    async fn insert_scan(&mut self, scan: &NewScan) -> Result<ScanRecord>;
    async fn list_tool_ids(&mut self) -> Result<Vec<ToolId>>;
    async fn insert_scan_host(
        &mut self,
        scan_id: ScanId,
        host_id: HostId,
    ) -> Result<()>;
    async fn insert_scan_result(
        &mut self,
        scan_id: ScanId,
        host_id: HostId,
        tool_id: ToolId,
        status: ResultStatus,
    ) -> Result<()>;
    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}
