//! Compile-only checks that the Postgres executors plug into builders.

#![allow(dead_code)]

use pipehood::{
    LogConfig, LoggingExecutor, Payload, PgExecutor, QbResult, QueryBuilderFactory,
};
use std::time::Duration;

async fn _client_executor_compiles(client: tokio_postgres::Client) -> QbResult<()> {
    let factory = QueryBuilderFactory::postgres(PgExecutor::new(client));
    let rows = factory.create().table("users").limit(1).execute().await?;
    let _: Option<i64> = rows.first().map(|row| row.get("id"));
    Ok(())
}

async fn _transaction_executor_compiles(client: &mut tokio_postgres::Client) -> QbResult<()> {
    let tx = client.transaction().await?;
    {
        let factory = QueryBuilderFactory::postgres(PgExecutor::new(&tx));
        factory
            .create()
            .table("accounts")
            .update(Payload::new().set("balance", 0i64))
            .where_eq("id", 1i64)
            .execute()
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

async fn _logged_executor_compiles(client: &tokio_postgres::Client) -> QbResult<()> {
    let config = LogConfig::new()
        .level(tracing::Level::INFO)
        .slow_query_threshold(Duration::from_millis(50))
        .log_params(true);
    let factory =
        QueryBuilderFactory::postgres(LoggingExecutor::with_config(PgExecutor::new(client), config));
    let _ = factory.create().table("users").fetch_opt().await?;
    Ok(())
}

#[cfg(feature = "pool")]
async fn _pool_executor_compiles(pool: deadpool_postgres::Pool) -> QbResult<()> {
    let factory = QueryBuilderFactory::postgres(pipehood::PoolExecutor::new(pool));
    let a = factory.create().table("users").where_eq("id", 1i64);
    let b = factory.create().table("users").where_eq("id", 2i64);
    let (left, right) = futures_util::future::try_join(a.execute(), b.execute()).await?;
    let _ = (left.len(), right.len());
    Ok(())
}

#[cfg(feature = "pool")]
async fn _pooled_client_executor_compiles(pool: &deadpool_postgres::Pool) -> QbResult<()> {
    let client = pool.get().await?;
    let factory = QueryBuilderFactory::postgres(PgExecutor::new(&client));
    factory.create().table("users").limit(1).execute().await?;
    Ok(())
}

#[test]
fn log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.level, tracing::Level::DEBUG);
    assert_eq!(config.max_sql_length, Some(200));
    assert!(!config.log_params);
    assert!(config.slow_query_threshold.is_none());
}
