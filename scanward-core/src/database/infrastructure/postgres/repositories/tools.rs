use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scanward_model::{Tool, ToolId};
use sqlx::{FromRow, PgPool};

use crate::database::ports::tools::ToolsRepository;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresToolsRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct ToolRow {
    id: i64,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl From<ToolRow> for Tool {
    fn from(row: ToolRow) -> Self {
        Tool {
            id: ToolId(row.id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

impl PostgresToolsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ToolsRepository for PostgresToolsRepository {
    async fn list_tools(&self) -> Result<Vec<Tool>> {
        let rows = sqlx::query_as::<_, ToolRow>(
            "SELECT id, name, description, created_at FROM tools ORDER BY id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to list tools: {e}")))?;

        Ok(rows.into_iter().map(Tool::from).collect())
    }

    async fn upsert_tool(&self, name: &str, description: &str) -> Result<Tool> {
        let row = sqlx::query_as::<_, ToolRow>(
            r#"
            INSERT INTO tools (name, description)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::Database(format!("Failed to upsert tool {name}: {e}"))
        })?;

        Ok(row.into())
    }
}
