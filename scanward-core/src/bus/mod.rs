//! Publish-only message bus used to hand scan lifecycle events to scanner
//! workers.

use async_trait::async_trait;

use crate::error::Result;

pub mod redis;
pub use self::redis::RedisEventBus;

#[async_trait]
pub trait EventBus: Send + Sync {
    /// Deliver `payload` to every current subscriber of `subject`.
    ///
    /// Delivery is at-most-once: a subscriber that is offline when the
    /// message is published never sees it.
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<()>;
}
