use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use scanward_model::{
    SCAN_CANCELLED_SUBJECT, SCAN_STARTED_SUBJECT, Scan, ScanCancelledEvent,
    ScanId, ScanStartedEvent,
};
use tracing::info;

use crate::{bus::EventBus, error::Result};

/// Serializes scan lifecycle events onto their bus subjects.
#[derive(Clone)]
pub struct ScanEventPublisher {
    bus: Arc<dyn EventBus>,
}

impl fmt::Debug for ScanEventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanEventPublisher")
            .field("bus", &"Arc<dyn EventBus>")
            .finish()
    }
}

impl ScanEventPublisher {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    pub async fn publish_scan_started(&self, scan: &Scan) -> Result<()> {
        let payload = serde_json::to_vec(&ScanStartedEvent::from_scan(scan))?;
        self.bus.publish(SCAN_STARTED_SUBJECT, payload).await?;
        info!(scan_id = %scan.id, targets = scan.targets.len(), "published scan started");
        Ok(())
    }

    pub async fn publish_scan_cancelled(
        &self,
        scan_id: ScanId,
        requested_at: DateTime<Utc>,
    ) -> Result<()> {
        let payload = serde_json::to_vec(&ScanCancelledEvent {
            scan_id,
            timestamp: requested_at.timestamp(),
        })?;
        self.bus.publish(SCAN_CANCELLED_SUBJECT, payload).await?;
        info!(scan_id = %scan_id, "published scan cancelled");
        Ok(())
    }
}
