use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::{HostId, OperatorId, ScanId, TenantId};
use crate::target::Target;

/// Lifecycle status of a scan row.
///
/// This crate only ever writes [`ScanStatus::Pending`]; the remaining values
/// are written by scanner workers and decoded by the summary reader.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ScanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Pending => "PENDING",
            ScanStatus::Running => "RUNNING",
            ScanStatus::Completed => "COMPLETED",
            ScanStatus::Failed => "FAILED",
            ScanStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for ScanStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ScanStatus::Pending),
            "RUNNING" => Ok(ScanStatus::Running),
            "COMPLETED" => Ok(ScanStatus::Completed),
            "FAILED" => Ok(ScanStatus::Failed),
            "CANCELLED" => Ok(ScanStatus::Cancelled),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single (scan, host, tool) work item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl ResultStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultStatus::Pending => "PENDING",
            ResultStatus::Running => "RUNNING",
            ResultStatus::Completed => "COMPLETED",
            ResultStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for ResultStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ResultStatus::Pending),
            "RUNNING" => Ok(ResultStatus::Running),
            "COMPLETED" => Ok(ResultStatus::Completed),
            "FAILED" => Ok(ResultStatus::Failed),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `scans` row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: ScanId,
    pub tenant_id: TenantId,
    pub operator_id: OperatorId,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// A freshly created scan together with the hosts and targets it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scan {
    pub id: ScanId,
    pub tenant_id: TenantId,
    pub operator_id: OperatorId,
    pub status: ScanStatus,
    pub host_ids: Vec<HostId>,
    pub targets: Vec<Target>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Scan {
    pub fn from_record(record: ScanRecord) -> Self {
        Scan {
            id: record.id,
            tenant_id: record.tenant_id,
            operator_id: record.operator_id,
            status: record.status,
            host_ids: Vec::new(),
            targets: Vec::new(),
            started_at: record.started_at,
            ended_at: record.ended_at,
        }
    }
}

/// Vulnerability counts bucketed by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub info: u32,
}

impl SeverityCounts {
    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low + self.info
    }
}

/// Reporting view of one host within one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_id: ScanId,
    pub host_id: HostId,
    pub host_alias: String,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Whole seconds between start and end; `None` while the scan is open.
    pub duration_secs: Option<i64>,
    pub vulnerabilities: u32,
    pub severities: SeverityCounts,
    pub tools_total: u32,
    pub tools_completed: u32,
}
