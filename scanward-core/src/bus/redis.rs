use std::fmt;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, info};

use super::EventBus;
use crate::error::{CoreError, Result};

/// [`EventBus`] over Redis pub/sub; subjects map one-to-one onto channels.
#[derive(Clone)]
pub struct RedisEventBus {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisEventBus")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisEventBus {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis message bus");

        let client = redis::Client::open(redis_url).map_err(|e| {
            CoreError::Bus(format!("Failed to create Redis client: {e}"))
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            CoreError::Bus(format!("Failed to connect to Redis: {e}"))
        })?;

        info!("Successfully connected to Redis message bus");

        Ok(Self { conn })
    }
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<()> {
        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(subject, payload).await.map_err(|e| {
            CoreError::Bus(format!("Redis PUBLISH to {subject} failed: {e}"))
        })?;

        debug!(subject, receivers, "published event");
        Ok(())
    }
}
