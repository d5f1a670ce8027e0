//! Scan lifecycle messages consumed by scanner workers.
//!
//! Subjects and field names are a wire contract shared with the worker
//! services and must not change.

use serde::{Deserialize, Serialize};

use crate::ids::ScanId;
use crate::scan::Scan;
use crate::target::Target;

pub const SCAN_STARTED_SUBJECT: &str = "event.scanstarted";
pub const SCAN_CANCELLED_SUBJECT: &str = "event.scancancelled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStartedEvent {
    #[serde(rename = "scanID")]
    pub scan_id: ScanId,
    pub targets: Vec<Target>,
    /// Unix seconds at which the scan was created.
    pub timestamp: i64,
}

impl ScanStartedEvent {
    pub fn from_scan(scan: &Scan) -> Self {
        ScanStartedEvent {
            scan_id: scan.id,
            targets: scan.targets.clone(),
            timestamp: scan.started_at.timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCancelledEvent {
    #[serde(rename = "scanID")]
    pub scan_id: ScanId,
    /// Unix seconds at which cancellation was requested.
    pub timestamp: i64,
}
