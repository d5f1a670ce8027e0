use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use scanward_core::bus::EventBus;
use scanward_core::error::{CoreError, Result};

/// One message seen by [`RecordingBus`], payload decoded as JSON.
#[derive(Debug, Clone)]
pub struct Published {
    pub subject: String,
    pub payload: Value,
}

/// Keeps every published message; can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct RecordingBus {
    published: Mutex<Vec<Published>>,
    failing: AtomicBool,
}

impl RecordingBus {
    pub fn failing() -> Self {
        let bus = Self::default();
        bus.failing.store(true, Ordering::SeqCst);
        bus
    }

    pub async fn published(&self) -> Vec<Published> {
        self.published.lock().await.clone()
    }

    pub async fn on_subject(&self, subject: &str) -> Vec<Value> {
        self.published
            .lock()
            .await
            .iter()
            .filter(|p| p.subject == subject)
            .map(|p| p.payload.clone())
            .collect()
    }
}

#[async_trait]
impl EventBus for RecordingBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CoreError::Bus("bus unavailable".into()));
        }
        let payload = serde_json::from_slice(&payload)?;
        self.published.lock().await.push(Published {
            subject: subject.to_string(),
            payload,
        });
        Ok(())
    }
}
