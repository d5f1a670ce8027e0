use std::{fmt, sync::Arc};

use scanward_model::{
    Host, OperatorId, ResultStatus, Scan, ScanStatus, Target, TenantId,
};
use tracing::{debug, info, warn};

use super::error::ScanError;
use crate::database::ports::scans::{NewScan, ScanStore, ScanTransaction};

/// Writes a scan, its host links and one pending result per (host, tool) as a
/// single all-or-nothing unit.
#[derive(Clone)]
pub struct ScanAggregateWriter {
    store: Arc<dyn ScanStore>,
}

impl fmt::Debug for ScanAggregateWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanAggregateWriter")
            .field("store", &"Arc<dyn ScanStore>")
            .finish()
    }
}

impl ScanAggregateWriter {
    pub fn new(store: Arc<dyn ScanStore>) -> Self {
        Self { store }
    }

    pub async fn create_scan(
        &self,
        tenant_id: TenantId,
        operator_id: OperatorId,
        hosts: &[Host],
    ) -> Result<Scan, ScanError> {
        if hosts.is_empty() {
            return Err(ScanError::NoHosts);
        }

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(ScanError::storage("begin transaction"))?;

        match write_aggregate(tx.as_mut(), tenant_id, operator_id, hosts).await {
            Ok(scan) => {
                tx.commit().await.map_err(ScanError::storage("commit"))?;
                info!(
                    scan_id = %scan.id,
                    tenant_id = %tenant_id,
                    host_count = scan.host_ids.len(),
                    "scan created"
                );
                Ok(scan)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(
                        error = %rollback_err,
                        "rollback after failed scan write also failed"
                    );
                }
                Err(err)
            }
        }
    }
}

async fn write_aggregate(
    tx: &mut dyn ScanTransaction,
    tenant_id: TenantId,
    operator_id: OperatorId,
    hosts: &[Host],
) -> Result<Scan, ScanError> {
    let record = tx
        .insert_scan(&NewScan {
            tenant_id,
            operator_id,
            status: ScanStatus::Pending,
        })
        .await
        .map_err(ScanError::storage("insert scan"))?;

    let mut scan = Scan::from_record(record);

    for host in hosts {
        scan.targets.push(Target::resolve(host));
        scan.host_ids.push(host.id);
        tx.insert_scan_host(scan.id, host.id)
            .await
            .map_err(ScanError::storage("insert scan host"))?;
    }

    let tool_ids = tx
        .list_tool_ids()
        .await
        .map_err(ScanError::storage("list tools"))?;
    if tool_ids.is_empty() {
        return Err(ScanError::Internal("no scan tools registered".into()));
    }

    for host in hosts {
        for tool_id in &tool_ids {
            tx.insert_scan_result(scan.id, host.id, *tool_id, ResultStatus::Pending)
                .await
                .map_err(ScanError::storage("insert scan result"))?;
        }
    }

    debug!(
        scan_id = %scan.id,
        results = hosts.len() * tool_ids.len(),
        "scan work items written"
    );
    Ok(scan)
}
