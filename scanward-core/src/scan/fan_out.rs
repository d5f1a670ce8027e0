use std::{collections::HashSet, fmt, sync::Arc};

use scanward_model::{Host, HostId, TenantId};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, warn};

use super::error::ScanError;
use crate::database::ports::hosts::HostsRepository;

pub const DEFAULT_MAX_CONCURRENT_HOST_LOOKUPS: usize = 16;

/// Turn caller-supplied host ID strings into typed IDs.
///
/// Fails on the first empty or malformed entry. Repeated IDs are dropped,
/// keeping the first occurrence.
pub fn parse_host_ids<S: AsRef<str>>(raw: &[S]) -> Result<Vec<HostId>, ScanError> {
    if raw.is_empty() {
        return Err(ScanError::NoHosts);
    }

    let mut seen = HashSet::with_capacity(raw.len());
    let mut ids = Vec::with_capacity(raw.len());
    for value in raw {
        let id = HostId::parse(value.as_ref()).map_err(ScanError::InvalidHostId)?;
        if seen.insert(id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Fetches hosts concurrently, one task per ID, with at most
/// `max_concurrent` lookups in flight.
///
/// The bound is per resolver, not per call. Clones share one semaphore, so
/// concurrent scan creations on one `ScanService` draw from the same
/// permits and together stay within `max_concurrent` lookups.
#[derive(Clone)]
pub struct HostResolver {
    hosts: Arc<dyn HostsRepository>,
    limiter: Arc<Semaphore>,
    max_concurrent: usize,
}

impl fmt::Debug for HostResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostResolver")
            .field("hosts", &"Arc<dyn HostsRepository>")
            .field("max_concurrent", &self.max_concurrent)
            .finish()
    }
}

impl HostResolver {
    pub fn new(hosts: Arc<dyn HostsRepository>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            hosts,
            limiter: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn hosts(&self) -> Arc<dyn HostsRepository> {
        Arc::clone(&self.hosts)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Resolve every ID to a host owned by `tenant_id`.
    ///
    /// All lookups run to completion before the outcome is decided; the
    /// first failure observed then fails the whole call. Hosts come back in
    /// the order their IDs were given.
    pub async fn resolve_hosts(
        &self,
        tenant_id: TenantId,
        ids: &[HostId],
    ) -> Result<Vec<Host>, ScanError> {
        if ids.is_empty() {
            return Err(ScanError::NoHosts);
        }

        let mut tasks = JoinSet::new();
        for (slot, id) in ids.iter().copied().enumerate() {
            let hosts = Arc::clone(&self.hosts);
            let limiter = Arc::clone(&self.limiter);
            tasks.spawn(async move {
                let _permit = limiter.acquire_owned().await.map_err(|_| {
                    ScanError::Internal("host lookup limiter closed".into())
                })?;

                let host = hosts
                    .get_host_by_id(id)
                    .await
                    .map_err(ScanError::storage("fetch host"))?;

                match host {
                    Some(host) if host.tenant_id == tenant_id => Ok((slot, host)),
                    Some(_) => {
                        // Reported exactly like a missing host.
                        debug!(host_id = %id, "host belongs to another tenant");
                        Err(ScanError::HostNotFound(id))
                    }
                    None => Err(ScanError::HostNotFound(id)),
                }
            });
        }

        let mut resolved: Vec<Option<Host>> = vec![None; ids.len()];
        let mut first_error = None;

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_err) => Err(ScanError::Internal(format!(
                    "host lookup task failed: {join_err}"
                ))),
            };

            match outcome {
                Ok((slot, host)) => resolved[slot] = Some(host),
                Err(err) => {
                    warn!(error = %err, "host lookup failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        resolved
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ScanError::Internal("host lookup left a gap".into()))
    }
}
