use scanward_model::{HostId, ModelError};
use thiserror::Error;

use crate::error::CoreError;

/// Who is to blame for a failed scan operation; the HTTP layer maps this
/// onto 400 / 404 / 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Client,
    NotFound,
    Server,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("at least one host is required")]
    NoHosts,

    #[error("invalid host id: {0}")]
    InvalidHostId(#[source] ModelError),

    #[error("invalid scan id: {0}")]
    InvalidScanId(#[source] ModelError),

    #[error("host {0} not found")]
    HostNotFound(HostId),

    #[error("{step} failed: {source}")]
    Storage {
        step: &'static str,
        #[source]
        source: CoreError,
    },

    #[error("failed to publish scan event: {0}")]
    Publish(#[source] CoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ScanError {
    pub fn fault(&self) -> Fault {
        match self {
            ScanError::NoHosts
            | ScanError::InvalidHostId(_)
            | ScanError::InvalidScanId(_) => Fault::Client,
            ScanError::HostNotFound(_) => Fault::NotFound,
            ScanError::Storage { .. }
            | ScanError::Publish(_)
            | ScanError::Internal(_) => Fault::Server,
        }
    }

    pub(crate) fn storage(step: &'static str) -> impl FnOnce(CoreError) -> Self {
        move |source| ScanError::Storage { step, source }
    }
}
