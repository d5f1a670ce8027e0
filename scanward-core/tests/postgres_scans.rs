#![cfg(feature = "postgres-tests")]

mod support;

use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;

use scanward_core::database::PostgresDatabase;
use scanward_core::database::ports::hosts::HostsRepository;
use scanward_core::scan::{ScanError, ScanService};
use scanward_core::tools::ToolRegistry;
use scanward_model::{Credential, HostId, NewHost, ScanStatus, TargetType};

use support::{OPERATOR, OTHER_TENANT, RecordingBus, TENANT};

fn new_host(alias: &str, domain: &str, ip: &str) -> NewHost {
    NewHost {
        tenant_id: TENANT,
        operator_id: OPERATOR,
        domain_name: domain.into(),
        ip_address: ip.into(),
        alias: alias.into(),
        credentials: Vec::new(),
        rapporteurs: Vec::new(),
    }
}

async fn table_count(pool: &PgPool, table: &str) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

async fn setup(pool: PgPool) -> anyhow::Result<(PostgresDatabase, ScanService, Arc<RecordingBus>)> {
    let db = PostgresDatabase::from_pool(pool);
    ToolRegistry::new(db.tools_repository()).ensure_defaults().await?;
    let bus = Arc::new(RecordingBus::default());
    let service = ScanService::new(db.hosts_repository(), db.scan_store(), bus.clone());
    Ok((db, service, bus))
}

#[sqlx::test(migrator = "scanward_core::MIGRATOR")]
async fn host_round_trips_with_credentials(pool: PgPool) -> anyhow::Result<()> {
    let db = PostgresDatabase::from_pool(pool);
    let hosts = db.hosts_repository();

    let mut input = new_host("web", "example.com", "");
    input.credentials.push(Credential {
        username: "scanner".into(),
        password: "s3cret".into(),
    });
    let created = hosts.create_host(&input).await?;

    let fetched = hosts.get_host_by_id(created.id).await?.expect("host exists");
    assert_eq!(fetched.alias, "web");
    assert_eq!(fetched.tenant_id, TENANT);
    assert_eq!(fetched.credentials, input.credentials);
    assert!(hosts.get_host_by_id(HostId(created.id.get() + 1000)).await?.is_none());
    Ok(())
}

#[sqlx::test(migrator = "scanward_core::MIGRATOR")]
async fn duplicate_alias_is_rejected(pool: PgPool) -> anyhow::Result<()> {
    let db = PostgresDatabase::from_pool(pool);
    let hosts = db.hosts_repository();

    hosts.create_host(&new_host("web", "example.com", "")).await?;
    let mut other = new_host("web", "", "10.0.0.1");
    other.tenant_id = OTHER_TENANT;

    assert!(hosts.create_host(&other).await.is_err());
    Ok(())
}

#[sqlx::test(migrator = "scanward_core::MIGRATOR")]
async fn tool_seeding_is_idempotent(pool: PgPool) -> anyhow::Result<()> {
    let db = PostgresDatabase::from_pool(pool.clone());
    let registry = ToolRegistry::new(db.tools_repository());

    registry.ensure_defaults().await?;
    registry.ensure_defaults().await?;

    assert_eq!(table_count(&pool, "tools").await?, 4);
    assert_eq!(registry.list().await?.len(), 4);
    Ok(())
}

#[sqlx::test(migrator = "scanward_core::MIGRATOR")]
async fn create_scan_writes_the_whole_aggregate(pool: PgPool) -> anyhow::Result<()> {
    let (db, service, bus) = setup(pool.clone()).await?;
    let hosts = db.hosts_repository();
    let web = hosts.create_host(&new_host("web", "example.com", "")).await?;
    let db_host = hosts.create_host(&new_host("db", "", "10.0.0.5")).await?;

    let scan = service
        .create_scan(TENANT, OPERATOR, &[web.id.to_string(), db_host.id.to_string()])
        .await?;

    assert_eq!(scan.targets[0].kind, TargetType::Domain);
    assert_eq!(scan.targets[1].kind, TargetType::Ip);
    assert_eq!(table_count(&pool, "scans").await?, 1);
    assert_eq!(table_count(&pool, "scan_hosts").await?, 2);
    assert_eq!(table_count(&pool, "scan_results").await?, 8);

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM scan_results WHERE scan_id = $1 AND status = 'PENDING' AND result IS NULL",
    )
    .bind(scan.id.to_uuid())
    .fetch_one(&pool)
    .await?;
    assert_eq!(pending, 8);

    let status: String = sqlx::query_scalar("SELECT status FROM scans WHERE id = $1")
        .bind(scan.id.to_uuid())
        .fetch_one(&pool)
        .await?;
    assert_eq!(status, "PENDING");
    assert_eq!(bus.published().await.len(), 1);
    Ok(())
}

#[sqlx::test(migrator = "scanward_core::MIGRATOR")]
async fn missing_host_leaves_no_rows(pool: PgPool) -> anyhow::Result<()> {
    let (db, service, bus) = setup(pool.clone()).await?;
    let web = db
        .hosts_repository()
        .create_host(&new_host("web", "example.com", ""))
        .await?;

    let err = service
        .create_scan(TENANT, OPERATOR, &[web.id.to_string(), "424242".into()])
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::HostNotFound(HostId(424242))));
    assert_eq!(table_count(&pool, "scans").await?, 0);
    assert_eq!(table_count(&pool, "scan_hosts").await?, 0);
    assert_eq!(table_count(&pool, "scan_results").await?, 0);
    assert!(bus.published().await.is_empty());
    Ok(())
}

#[sqlx::test(migrator = "scanward_core::MIGRATOR")]
async fn failed_result_insert_rolls_back(pool: PgPool) -> anyhow::Result<()> {
    let (db, service, _bus) = setup(pool.clone()).await?;
    let web = db
        .hosts_repository()
        .create_host(&new_host("web", "example.com", ""))
        .await?;

    // Reject the second tool's work item so the write fails part-way.
    sqlx::query(
        "ALTER TABLE scan_results ADD CONSTRAINT reject_dns CHECK (tool_id <> 2)",
    )
    .execute(&pool)
    .await?;

    let err = service
        .create_scan(TENANT, OPERATOR, &[web.id.to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Storage { step: "insert scan result", .. }));
    assert_eq!(table_count(&pool, "scans").await?, 0);
    assert_eq!(table_count(&pool, "scan_hosts").await?, 0);
    assert_eq!(table_count(&pool, "scan_results").await?, 0);
    Ok(())
}

#[sqlx::test(migrator = "scanward_core::MIGRATOR")]
async fn summaries_aggregate_worker_results(pool: PgPool) -> anyhow::Result<()> {
    let (db, service, _bus) = setup(pool.clone()).await?;
    let web = db
        .hosts_repository()
        .create_host(&new_host("web", "example.com", ""))
        .await?;

    let scan = service
        .create_scan(TENANT, OPERATOR, &[web.id.to_string()])
        .await?;

    sqlx::query(
        r#"
        UPDATE scan_results
        SET status = 'COMPLETED', result = $3
        WHERE scan_id = $1 AND host_id = $2 AND tool_id = 1
        "#,
    )
    .bind(scan.id.to_uuid())
    .bind(web.id.get())
    .bind(json!({"vulnerabilities": [
        {"id": "CVE-2024-1", "severity": "HIGH"},
        {"id": "CVE-2024-2", "severity": "low"},
    ]}))
    .execute(&pool)
    .await?;
    sqlx::query(
        "UPDATE scans SET status = 'COMPLETED', ended_at = started_at + INTERVAL '30 seconds' WHERE id = $1",
    )
    .bind(scan.id.to_uuid())
    .execute(&pool)
    .await?;

    let first = service.get_scan_summaries(TENANT).await?;
    let second = service.get_scan_summaries(TENANT).await?;
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);

    let summary = &first[0];
    assert_eq!(summary.host_alias, "web");
    assert_eq!(summary.status, ScanStatus::Completed);
    assert_eq!(summary.duration_secs, Some(30));
    assert_eq!(summary.vulnerabilities, 2);
    assert_eq!(summary.severities.high, 1);
    assert_eq!(summary.severities.low, 1);
    assert_eq!(summary.tools_total, 4);
    assert_eq!(summary.tools_completed, 1);

    assert!(service.get_scan_summaries(OTHER_TENANT).await?.is_empty());
    Ok(())
}
