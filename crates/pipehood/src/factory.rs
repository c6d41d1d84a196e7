//! Pre-wired builder construction.

use crate::builder::QueryBuilder;
use crate::compiler::PostgresCompiler;
use std::sync::Arc;

/// Binds a compiler and executor once and mints builders sharing them.
///
/// ```ignore
/// let pool = pipehood::create_pool(&database_url)?;
/// let factory = QueryBuilderFactory::postgres(PoolExecutor::new(pool));
///
/// let users = factory.create().table("users").limit(5).execute().await?;
/// ```
pub struct QueryBuilderFactory<C, E> {
    compiler: Arc<C>,
    executor: Arc<E>,
}

impl<C, E> QueryBuilderFactory<C, E> {
    pub fn new(compiler: C, executor: E) -> Self {
        Self::from_shared(Arc::new(compiler), Arc::new(executor))
    }

    /// Build from already shared handles.
    pub fn from_shared(compiler: Arc<C>, executor: Arc<E>) -> Self {
        Self { compiler, executor }
    }

    /// A fresh builder with an empty state.
    pub fn create(&self) -> QueryBuilder<C, E> {
        QueryBuilder::new(Arc::clone(&self.compiler), Arc::clone(&self.executor))
    }

    pub fn compiler(&self) -> &Arc<C> {
        &self.compiler
    }

    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }
}

impl<E> QueryBuilderFactory<PostgresCompiler, E> {
    /// Factory using the built-in [`PostgresCompiler`].
    pub fn postgres(executor: E) -> Self {
        Self::new(PostgresCompiler, executor)
    }
}

impl<C, E> Clone for QueryBuilderFactory<C, E> {
    fn clone(&self) -> Self {
        Self {
            compiler: Arc::clone(&self.compiler),
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<C, E> std::fmt::Debug for QueryBuilderFactory<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilderFactory").finish_non_exhaustive()
    }
}
