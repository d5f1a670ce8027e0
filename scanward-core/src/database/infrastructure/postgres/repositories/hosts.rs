use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scanward_model::{
    Credential, Host, HostId, NewHost, OperatorId, Rapporteur, TenantId,
};
use sqlx::{FromRow, PgPool, types::Json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::ports::hosts::HostsRepository;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresHostsRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct HostRow {
    id: i64,
    tenant_id: Uuid,
    operator_id: Uuid,
    domain: String,
    ip: String,
    alias: String,
    rapporteurs: Json<Vec<Rapporteur>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    username: String,
    password: String,
}

impl HostRow {
    fn into_host(self, credentials: Vec<Credential>) -> Host {
        Host {
            id: HostId(self.id),
            tenant_id: TenantId(self.tenant_id),
            operator_id: OperatorId(self.operator_id),
            domain_name: self.domain,
            ip_address: self.ip,
            alias: self.alias,
            credentials,
            rapporteurs: self.rapporteurs.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl PostgresHostsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_credentials(&self, host_id: i64) -> Result<Vec<Credential>> {
        let rows = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT username, password
            FROM credentials
            WHERE host_id = $1
            ORDER BY id
            "#,
        )
        .bind(host_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            CoreError::Database(format!(
                "Failed to load credentials for host {host_id}: {e}"
            ))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| Credential {
                username: row.username,
                password: row.password,
            })
            .collect())
    }
}

#[async_trait]
impl HostsRepository for PostgresHostsRepository {
    async fn get_host_by_id(&self, id: HostId) -> Result<Option<Host>> {
        let row = sqlx::query_as::<_, HostRow>(
            r#"
            SELECT
                id,
                tenant_id,
                operator_id,
                domain,
                ip,
                alias,
                rapporteurs,
                created_at,
                updated_at
            FROM hosts
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Database(format!("Failed to load host {id}: {e}"))
        })?;

        let Some(row) = row else {
            debug!(host_id = %id, "host not found");
            return Ok(None);
        };

        let credentials = self.load_credentials(row.id).await?;
        Ok(Some(row.into_host(credentials)))
    }

    async fn create_host(&self, host: &NewHost) -> Result<Host> {
        let host = &host.clone().normalized();
        if !host.has_address() {
            return Err(CoreError::InvalidInput(
                "host needs a domain name or an IP address".into(),
            ));
        }

        let mut tx = self.pool().begin().await.map_err(|e| {
            CoreError::Database(format!("Failed to start transaction: {e}"))
        })?;

        let row = sqlx::query_as::<_, HostRow>(
            r#"
            INSERT INTO hosts (tenant_id, operator_id, domain, ip, alias, rapporteurs)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id,
                tenant_id,
                operator_id,
                domain,
                ip,
                alias,
                rapporteurs,
                created_at,
                updated_at
            "#,
        )
        .bind(host.tenant_id.to_uuid())
        .bind(host.operator_id.to_uuid())
        .bind(&host.domain_name)
        .bind(&host.ip_address)
        .bind(&host.alias)
        .bind(Json(&host.rapporteurs))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::Database(format!(
                "Failed to insert host {}: {e}",
                host.alias
            ))
        })?;

        for credential in &host.credentials {
            sqlx::query(
                r#"
                INSERT INTO credentials (host_id, username, password)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(row.id)
            .bind(&credential.username)
            .bind(&credential.password)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                CoreError::Database(format!(
                    "Failed to insert credential for host {}: {e}",
                    host.alias
                ))
            })?;
        }

        tx.commit().await.map_err(|e| {
            CoreError::Database(format!("Failed to commit transaction: {e}"))
        })?;

        info!(host_id = row.id, alias = %row.alias, "created host");
        Ok(row.into_host(host.credentials.clone()))
    }
}
