//! Executors backed by tokio-postgres.

use super::Executor;
use crate::client::GenericClient;
use crate::error::QbResult;
use crate::value::Value;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

fn to_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

/// Executes on a single client or transaction.
///
/// ```ignore
/// let tx = client.transaction().await?;
/// let factory = QueryBuilderFactory::postgres(PgExecutor::new(&tx));
/// factory.create().table("users").where_eq("id", 1).delete().execute().await?;
/// tx.commit().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PgExecutor<C> {
    client: C,
}

impl<C: GenericClient> PgExecutor<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

impl<C: GenericClient> Executor for PgExecutor<C> {
    type Row = Row;

    async fn execute(&self, sql: &str, params: &[Value]) -> QbResult<Vec<Row>> {
        let refs = to_refs(params);
        self.client.query(sql, &refs).await
    }
}

/// Checks out one pooled connection per execution.
///
/// Builders sharing a `PoolExecutor` can run concurrently; each statement gets
/// its own connection for its duration.
#[cfg(feature = "pool")]
#[derive(Clone)]
pub struct PoolExecutor {
    pool: deadpool_postgres::Pool,
}

#[cfg(feature = "pool")]
impl PoolExecutor {
    pub fn new(pool: deadpool_postgres::Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &deadpool_postgres::Pool {
        &self.pool
    }
}

#[cfg(feature = "pool")]
impl std::fmt::Debug for PoolExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("PoolExecutor")
            .field("max_size", &status.max_size)
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

#[cfg(feature = "pool")]
impl Executor for PoolExecutor {
    type Row = Row;

    async fn execute(&self, sql: &str, params: &[Value]) -> QbResult<Vec<Row>> {
        let client = self.pool.get().await?;
        let refs = to_refs(params);
        GenericClient::query(&client, sql, &refs).await
    }
}
