//! Scan orchestration: resolve hosts, write the scan aggregate, announce it.

pub mod error;
pub mod fan_out;
pub mod publisher;
pub mod service;
pub mod summary;
pub mod writer;

pub use error::{Fault, ScanError};
pub use fan_out::{
    DEFAULT_MAX_CONCURRENT_HOST_LOOKUPS, HostResolver, parse_host_ids,
};
pub use publisher::ScanEventPublisher;
pub use service::ScanService;
pub use summary::{ScanSummaryReader, summarize};
pub use writer::ScanAggregateWriter;
