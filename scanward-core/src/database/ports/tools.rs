use async_trait::async_trait;
use scanward_model::Tool;

use crate::Result;

#[async_trait]
pub trait ToolsRepository: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<Tool>>;
    /// Insert the tool or refresh its description when the name is taken.
    async fn upsert_tool(&self, name: &str, description: &str) -> Result<Tool>;
}
