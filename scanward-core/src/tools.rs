use std::{fmt, sync::Arc};

use scanward_model::{BuiltinTool, Tool};
use tracing::info;

use crate::{database::ports::tools::ToolsRepository, error::Result};

/// Catalogue of scan tools. Every tool listed here gets one pending work
/// item per host of every new scan.
#[derive(Clone)]
pub struct ToolRegistry {
    repo: Arc<dyn ToolsRepository>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("repo", &"Arc<dyn ToolsRepository>")
            .finish()
    }
}

impl ToolRegistry {
    pub fn new(repo: Arc<dyn ToolsRepository>) -> Self {
        Self { repo }
    }

    /// Register the built-in tools. Safe to run on every start.
    pub async fn ensure_defaults(&self) -> Result<Vec<Tool>> {
        let mut tools = Vec::with_capacity(BuiltinTool::ALL.len());
        for builtin in BuiltinTool::ALL {
            let tool = self
                .repo
                .upsert_tool(builtin.name(), builtin.description())
                .await?;
            tools.push(tool);
        }

        info!(count = tools.len(), "built-in scan tools registered");
        Ok(tools)
    }

    pub async fn list(&self) -> Result<Vec<Tool>> {
        self.repo.list_tools().await
    }
}
