use std::{fmt, sync::Arc};

use scanward_model::{ResultStatus, ScanSummary, SeverityCounts, TenantId};
use serde_json::Value;
use tracing::debug;

use super::error::ScanError;
use crate::database::ports::scans::{
    ScanResultSnapshot, ScanStore, ScanSummaryRow,
};

/// Read-only reporting over a tenant's scans.
#[derive(Clone)]
pub struct ScanSummaryReader {
    store: Arc<dyn ScanStore>,
}

impl fmt::Debug for ScanSummaryReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSummaryReader")
            .field("store", &"Arc<dyn ScanStore>")
            .finish()
    }
}

impl ScanSummaryReader {
    pub fn new(store: Arc<dyn ScanStore>) -> Self {
        Self { store }
    }

    pub async fn get_scan_summaries(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ScanSummary>, ScanError> {
        let rows = self
            .store
            .scan_summary_rows(tenant_id)
            .await
            .map_err(ScanError::storage("load scan summaries"))?;

        let summaries = summarize(rows);
        debug!(tenant_id = %tenant_id, count = summaries.len(), "scan summaries built");
        Ok(summaries)
    }
}

/// Build one summary per (scan, host) row, newest scan first and hosts by
/// alias within a scan.
pub fn summarize(rows: Vec<ScanSummaryRow>) -> Vec<ScanSummary> {
    let mut summaries: Vec<ScanSummary> = rows.into_iter().map(summarize_row).collect();
    summaries.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| a.host_alias.cmp(&b.host_alias))
            .then_with(|| a.scan_id.cmp(&b.scan_id))
    });
    summaries
}

fn summarize_row(row: ScanSummaryRow) -> ScanSummary {
    let severities = count_severities(&row.results);
    let tools_completed = row
        .results
        .iter()
        .filter(|r| r.status == ResultStatus::Completed)
        .count();

    ScanSummary {
        scan_id: row.scan_id,
        host_id: row.host_id,
        host_alias: row.alias,
        status: row.status,
        started_at: row.started_at,
        ended_at: row.ended_at,
        duration_secs: row
            .ended_at
            .map(|ended| (ended - row.started_at).num_seconds()),
        vulnerabilities: severities.total(),
        severities,
        tools_total: row.results.len() as u32,
        tools_completed: tools_completed as u32,
    }
}

fn count_severities(results: &[ScanResultSnapshot]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();

    let findings = results
        .iter()
        .filter_map(|r| r.result.as_ref())
        .filter_map(|doc| doc.get("vulnerabilities").and_then(Value::as_array))
        .flatten();

    for finding in findings {
        let severity = finding
            .get("severity")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        match severity.as_str() {
            "critical" => counts.critical += 1,
            "high" => counts.high += 1,
            "medium" => counts.medium += 1,
            "low" => counts.low += 1,
            _ => counts.info += 1,
        }
    }

    counts
}
