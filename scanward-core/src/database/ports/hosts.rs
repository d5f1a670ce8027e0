use async_trait::async_trait;
use scanward_model::{Host, HostId, NewHost};

use crate::Result;

#[async_trait]
pub trait HostsRepository: Send + Sync {
    /// Fetch a host with its credentials and rapporteurs. `Ok(None)` when no
    /// host has this ID.
    async fn get_host_by_id(&self, id: HostId) -> Result<Option<Host>>;
    async fn create_host(&self, host: &NewHost) -> Result<Host>;
}
