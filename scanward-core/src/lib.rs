//! # Scanward Core
//!
//! Scan orchestration for tenant-owned hosts: resolve the hosts a caller asks
//! for, record the scan and its per-tool work items in one transaction, and
//! announce the scan lifecycle on the message bus so scanner workers can pick
//! the work up.
//!
//! ## Architecture
//!
//! - [`database`]: repository ports and their Postgres adapters
//! - [`bus`]: the publish-only message bus port and its Redis adapter
//! - [`tools`]: the scan tool catalogue
//! - [`scan`]: host fan-out, the transactional writer, event publishing,
//!   summaries, and the [`scan::ScanService`] facade tying them together

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod bus;
pub mod database;
pub mod error;
pub mod scan;
pub mod tools;

pub use error::{CoreError, Result};

/// Embedded schema migrations for the Postgres adapters.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
