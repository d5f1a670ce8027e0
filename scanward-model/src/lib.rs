//! Core data model definitions shared across Scanward crates.
#![allow(missing_docs)]

pub mod error;
pub mod events;
pub mod host;
pub mod ids;
pub mod scan;
pub mod target;
pub mod tool;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use events::{
    SCAN_CANCELLED_SUBJECT, SCAN_STARTED_SUBJECT, ScanCancelledEvent,
    ScanStartedEvent,
};
pub use host::{Credential, Host, NewHost, Rapporteur};
pub use ids::{HostId, OperatorId, ScanId, TenantId, ToolId};
pub use scan::{
    ResultStatus, Scan, ScanRecord, ScanStatus, ScanSummary, SeverityCounts,
};
pub use target::{Target, TargetType};
pub use tool::{BuiltinTool, Tool};
