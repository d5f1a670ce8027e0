use std::sync::Arc;

use chrono::Utc;
use scanward_model::{OperatorId, Scan, ScanId, ScanSummary, TenantId};
use tracing::{error, instrument};

use super::error::ScanError;
use super::fan_out::{
    DEFAULT_MAX_CONCURRENT_HOST_LOOKUPS, HostResolver, parse_host_ids,
};
use super::publisher::ScanEventPublisher;
use super::summary::ScanSummaryReader;
use super::writer::ScanAggregateWriter;
use crate::bus::EventBus;
use crate::database::ports::{hosts::HostsRepository, scans::ScanStore};

/// Entry points for creating, cancelling and reporting on scans.
#[derive(Debug, Clone)]
pub struct ScanService {
    resolver: HostResolver,
    writer: ScanAggregateWriter,
    publisher: ScanEventPublisher,
    summaries: ScanSummaryReader,
}

impl ScanService {
    pub fn new(
        hosts: Arc<dyn HostsRepository>,
        store: Arc<dyn ScanStore>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            resolver: HostResolver::new(hosts, DEFAULT_MAX_CONCURRENT_HOST_LOOKUPS),
            writer: ScanAggregateWriter::new(Arc::clone(&store)),
            publisher: ScanEventPublisher::new(bus),
            summaries: ScanSummaryReader::new(store),
        }
    }

    /// Replace the host lookup concurrency bound (values below 1 become 1).
    pub fn with_max_concurrent_host_lookups(mut self, limit: usize) -> Self {
        self.resolver = HostResolver::new(self.resolver.hosts(), limit);
        self
    }

    /// Create a pending scan over `host_ids` and announce it to scanner
    /// workers.
    ///
    /// The scan is durable once this returns `Ok`; a failure to publish the
    /// start event is logged and does not undo it.
    #[instrument(
        skip_all,
        fields(tenant_id = %tenant_id, operator_id = %operator_id, host_count = host_ids.len())
    )]
    pub async fn create_scan<S: AsRef<str>>(
        &self,
        tenant_id: TenantId,
        operator_id: OperatorId,
        host_ids: &[S],
    ) -> Result<Scan, ScanError> {
        let ids = parse_host_ids(host_ids)?;
        let hosts = self.resolver.resolve_hosts(tenant_id, &ids).await?;
        let scan = self.writer.create_scan(tenant_id, operator_id, &hosts).await?;

        if let Err(err) = self.publisher.publish_scan_started(&scan).await {
            error!(scan_id = %scan.id, error = %err, "failed to publish scan started event");
        }

        Ok(scan)
    }

    /// Ask scanner workers to stop working on `scan_id`.
    ///
    /// Persisted scan status is left untouched.
    #[instrument(skip(self))]
    pub async fn cancel_scan(&self, scan_id: &str) -> Result<ScanId, ScanError> {
        let scan_id = ScanId::parse(scan_id).map_err(ScanError::InvalidScanId)?;
        self.publisher
            .publish_scan_cancelled(scan_id, Utc::now())
            .await
            .map_err(ScanError::Publish)?;
        Ok(scan_id)
    }

    #[instrument(skip_all, fields(tenant_id = %tenant_id))]
    pub async fn get_scan_summaries(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ScanSummary>, ScanError> {
        self.summaries.get_scan_summaries(tenant_id).await
    }
}
