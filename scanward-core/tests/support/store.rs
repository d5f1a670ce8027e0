use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;

use scanward_core::database::ports::hosts::HostsRepository;
use scanward_core::database::ports::scans::{
    NewScan, ScanResultSnapshot, ScanStore, ScanSummaryRow, ScanTransaction,
};
use scanward_core::database::ports::tools::ToolsRepository;
use scanward_core::error::{CoreError, Result};
use scanward_model::{
    Host, HostId, NewHost, ResultStatus, ScanId, ScanRecord, ScanStatus,
    TenantId, Tool, ToolId,
};

#[derive(Debug, Clone)]
struct StoredResult {
    scan_id: ScanId,
    host_id: HostId,
    tool_id: ToolId,
    status: ResultStatus,
    result: Option<Value>,
}

#[derive(Debug, Default)]
struct Tables {
    hosts: Vec<Host>,
    tools: Vec<Tool>,
    scans: Vec<ScanRecord>,
    scan_hosts: Vec<(ScanId, HostId)>,
    scan_results: Vec<StoredResult>,
}

/// Committed row counts of the scan aggregate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCounts {
    pub scans: usize,
    pub scan_hosts: usize,
    pub scan_results: usize,
}

/// Transactional in-memory stand-in for the Postgres adapters.
///
/// Writes made through a [`ScanTransaction`] stay private to it until
/// commit. `fail_at` makes the named step return a database error.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_at: Arc<Mutex<Option<&'static str>>>,
    host_lookups: Arc<AtomicUsize>,
    begins: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl InMemoryStore {
    pub async fn fail_at(&self, step: &'static str) {
        *self.fail_at.lock().await = Some(step);
    }

    pub async fn add_host(
        &self,
        tenant_id: TenantId,
        domain: &str,
        ip: &str,
        alias: &str,
    ) -> Host {
        let mut tables = self.tables.lock().await;
        let host = Host {
            id: HostId(tables.hosts.len() as i64 + 1),
            tenant_id,
            operator_id: super::OPERATOR,
            domain_name: domain.into(),
            ip_address: ip.into(),
            alias: alias.into(),
            credentials: Vec::new(),
            rapporteurs: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.hosts.push(host.clone());
        host
    }

    pub async fn add_tool(&self, name: &str) -> ToolId {
        let mut tables = self.tables.lock().await;
        let id = ToolId(tables.tools.len() as i64 + 1);
        tables.tools.push(Tool {
            id,
            name: name.into(),
            description: String::new(),
            created_at: Utc::now(),
        });
        id
    }

    pub async fn counts(&self) -> RowCounts {
        let tables = self.tables.lock().await;
        RowCounts {
            scans: tables.scans.len(),
            scan_hosts: tables.scan_hosts.len(),
            scan_results: tables.scan_results.len(),
        }
    }

    pub async fn scan(&self, id: ScanId) -> Option<ScanRecord> {
        let tables = self.tables.lock().await;
        tables.scans.iter().find(|s| s.id == id).cloned()
    }

    pub async fn result_statuses(&self, scan_id: ScanId) -> Vec<ResultStatus> {
        let tables = self.tables.lock().await;
        tables
            .scan_results
            .iter()
            .filter(|r| r.scan_id == scan_id)
            .map(|r| r.status)
            .collect()
    }

    pub async fn scan_host_ids(&self, scan_id: ScanId) -> Vec<HostId> {
        let tables = self.tables.lock().await;
        tables
            .scan_hosts
            .iter()
            .filter(|(scan, _)| *scan == scan_id)
            .map(|(_, host)| *host)
            .collect()
    }

    /// Play the part of a scanner worker reporting a finished tool run.
    pub async fn complete_result(
        &self,
        scan_id: ScanId,
        host_id: HostId,
        tool_id: ToolId,
        document: Value,
    ) {
        let mut tables = self.tables.lock().await;
        for row in tables.scan_results.iter_mut() {
            if row.scan_id == scan_id && row.host_id == host_id && row.tool_id == tool_id {
                row.status = ResultStatus::Completed;
                row.result = Some(document.clone());
            }
        }
    }

    pub async fn finish_scan(&self, scan_id: ScanId, ended_at: DateTime<Utc>) {
        let mut tables = self.tables.lock().await;
        if let Some(scan) = tables.scans.iter_mut().find(|s| s.id == scan_id) {
            scan.status = ScanStatus::Completed;
            scan.ended_at = Some(ended_at);
        }
    }

    pub fn host_lookups(&self) -> usize {
        self.host_lookups.load(Ordering::SeqCst)
    }

    pub fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostsRepository for InMemoryStore {
    async fn get_host_by_id(&self, id: HostId) -> Result<Option<Host>> {
        self.host_lookups.fetch_add(1, Ordering::SeqCst);
        if *self.fail_at.lock().await == Some("fetch host") {
            return Err(CoreError::Database("injected failure".into()));
        }
        let tables = self.tables.lock().await;
        Ok(tables.hosts.iter().find(|h| h.id == id).cloned())
    }

    async fn create_host(&self, host: &NewHost) -> Result<Host> {
        let host = &host.clone().normalized();
        if !host.has_address() {
            return Err(CoreError::InvalidInput(
                "host needs a domain name or an IP address".into(),
            ));
        }
        let mut tables = self.tables.lock().await;
        if tables.hosts.iter().any(|h| h.alias == host.alias) {
            return Err(CoreError::Database(format!(
                "duplicate alias {}",
                host.alias
            )));
        }
        let created = Host {
            id: HostId(tables.hosts.len() as i64 + 1),
            tenant_id: host.tenant_id,
            operator_id: host.operator_id,
            domain_name: host.domain_name.clone(),
            ip_address: host.ip_address.clone(),
            alias: host.alias.clone(),
            credentials: host.credentials.clone(),
            rapporteurs: host.rapporteurs.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.hosts.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ToolsRepository for InMemoryStore {
    async fn list_tools(&self) -> Result<Vec<Tool>> {
        Ok(self.tables.lock().await.tools.clone())
    }

    async fn upsert_tool(&self, name: &str, description: &str) -> Result<Tool> {
        let mut tables = self.tables.lock().await;
        if let Some(tool) = tables.tools.iter_mut().find(|t| t.name == name) {
            tool.description = description.into();
            return Ok(tool.clone());
        }
        let tool = Tool {
            id: ToolId(tables.tools.len() as i64 + 1),
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
        };
        tables.tools.push(tool.clone());
        Ok(tool)
    }
}

#[async_trait]
impl ScanStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn ScanTransaction>> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryTransaction {
            tables: Arc::clone(&self.tables),
            fail_at: *self.fail_at.lock().await,
            rollbacks: Arc::clone(&self.rollbacks),
            pending: Tables::default(),
        }))
    }

    async fn scan_summary_rows(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ScanSummaryRow>> {
        let tables = self.tables.lock().await;
        let aliases: HashMap<HostId, &str> = tables
            .hosts
            .iter()
            .map(|h| (h.id, h.alias.as_str()))
            .collect();

        let mut rows = Vec::new();
        for scan in tables.scans.iter().filter(|s| s.tenant_id == tenant_id) {
            for (_, host_id) in tables.scan_hosts.iter().filter(|(id, _)| *id == scan.id) {
                let results = tables
                    .scan_results
                    .iter()
                    .filter(|r| r.scan_id == scan.id && r.host_id == *host_id)
                    .map(|r| ScanResultSnapshot {
                        status: r.status,
                        result: r.result.clone(),
                    })
                    .collect();
                rows.push(ScanSummaryRow {
                    scan_id: scan.id,
                    host_id: *host_id,
                    alias: aliases.get(host_id).copied().unwrap_or_default().to_string(),
                    status: scan.status,
                    started_at: scan.started_at,
                    ended_at: scan.ended_at,
                    results,
                });
            }
        }
        Ok(rows)
    }
}

struct InMemoryTransaction {
    tables: Arc<Mutex<Tables>>,
    fail_at: Option<&'static str>,
    rollbacks: Arc<AtomicUsize>,
    pending: Tables,
}

impl InMemoryTransaction {
    fn check(&self, step: &'static str) -> Result<()> {
        if self.fail_at == Some(step) {
            return Err(CoreError::Database(format!("injected failure at {step}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ScanTransaction for InMemoryTransaction {
    async fn insert_scan(&mut self, scan: &NewScan) -> Result<ScanRecord> {
        self.check("insert scan")?;
        let record = ScanRecord {
            id: ScanId::new(),
            tenant_id: scan.tenant_id,
            operator_id: scan.operator_id,
            status: scan.status,
            started_at: Utc::now(),
            ended_at: None,
        };
        self.pending.scans.push(record.clone());
        Ok(record)
    }

    async fn list_tool_ids(&mut self) -> Result<Vec<ToolId>> {
        self.check("list tools")?;
        let tables = self.tables.lock().await;
        Ok(tables.tools.iter().map(|t| t.id).collect())
    }

    async fn insert_scan_host(
        &mut self,
        scan_id: ScanId,
        host_id: HostId,
    ) -> Result<()> {
        self.check("insert scan host")?;
        self.pending.scan_hosts.push((scan_id, host_id));
        Ok(())
    }

    async fn insert_scan_result(
        &mut self,
        scan_id: ScanId,
        host_id: HostId,
        tool_id: ToolId,
        status: ResultStatus,
    ) -> Result<()> {
        self.check("insert scan result")?;
        self.pending.scan_results.push(StoredResult {
            scan_id,
            host_id,
            tool_id,
            status,
            result: None,
        });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.check("commit")?;
        let pending = self.pending;
        let mut tables = self.tables.lock().await;
        tables.scans.extend(pending.scans);
        tables.scan_hosts.extend(pending.scan_hosts);
        tables.scan_results.extend(pending.scan_results);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
