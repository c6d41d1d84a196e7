//! Fluent query builder.
//!
//! Each mutator consumes the builder and hands it back, so calls chain:
//!
//! ```ignore
//! let rows = factory
//!     .create()
//!     .table("users")
//!     .select(["id", "name"])
//!     .where_eq("status", "active")
//!     .order_by_desc("created_at")
//!     .limit(10)
//!     .execute()
//!     .await?;
//! ```
//!
//! Nothing is validated while building. [`QueryBuilder::compile`] checks the
//! accumulated state and either returns `(sql, params)` or a
//! [`QbError::Validation`](crate::QbError::Validation).

use crate::compiler::{CompiledQuery, Compiler};
use crate::error::{QbError, QbResult};
use crate::executor::Executor;
use crate::state::{Fragment, Payload, QueryState, SortDirection, StatementKind};
use crate::value::Value;
use std::sync::Arc;

/// Accumulates one statement's shape and delegates to a compiler and executor.
pub struct QueryBuilder<C, E> {
    compiler: Arc<C>,
    executor: Arc<E>,
    state: QueryState,
}

impl<C, E> QueryBuilder<C, E> {
    /// Create a builder with an empty SELECT state.
    pub fn new(compiler: Arc<C>, executor: Arc<E>) -> Self {
        Self {
            compiler,
            executor,
            state: QueryState::new(),
        }
    }

    /// Read-only view of the accumulated state.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn compiler(&self) -> &Arc<C> {
        &self.compiler
    }

    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    // ==================== Target & projection ====================

    /// Set the target table. Overwrites any previous value.
    ///
    /// The name is emitted verbatim (aliases like `"users u"` pass through);
    /// emptiness is checked at compile time.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.state.set_table(name.into());
        self
    }

    /// Append projected columns. Repeated calls accumulate.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self.state.push_column(column.into());
        }
        self
    }

    /// Append one projected column.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.state.push_column(column.into());
        self
    }

    // ==================== WHERE ====================

    /// Add WHERE: column = value
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let text = format!("{} = ?", column.into());
        self.state.push_predicate(Fragment::new(text, vec![value.into()]));
        self
    }

    /// Add a WHERE fragment with `?` markers, one per argument.
    ///
    /// The marker/argument counts are checked when the query is compiled.
    ///
    /// ```ignore
    /// qb.where_raw("created_at > ? OR priority >= ?", values![since, 3i32])
    /// ```
    pub fn where_raw<I, V>(mut self, template: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let args = args.into_iter().map(Into::into).collect();
        self.state.push_predicate(Fragment::new(template, args));
        self
    }

    /// Add WHERE: column IN (values...)
    ///
    /// An empty list yields `1=0`, which matches no rows.
    pub fn where_in<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let fragment = if values.is_empty() {
            Fragment::new("1=0", Vec::new())
        } else {
            let markers = vec!["?"; values.len()].join(", ");
            Fragment::new(format!("{} IN ({})", column.into(), markers), values)
        };
        self.state.push_predicate(fragment);
        self
    }

    // ==================== Ordering & pagination ====================

    /// Append an ORDER BY element.
    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.state.push_order(column.into(), direction);
        self
    }

    /// Add ORDER BY column ASC.
    pub fn order_by_asc(self, column: impl Into<String>) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    /// Add ORDER BY column DESC.
    pub fn order_by_desc(self, column: impl Into<String>) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    /// Set LIMIT (last call wins).
    pub fn limit(mut self, n: u64) -> Self {
        self.state.set_limit(n);
        self
    }

    /// Set OFFSET (last call wins).
    pub fn offset(mut self, n: u64) -> Self {
        self.state.set_offset(n);
        self
    }

    // ==================== Statement kind ====================

    /// Turn this into an INSERT of `payload`.
    pub fn insert(mut self, payload: impl Into<Payload>) -> Self {
        self.state.set_kind(StatementKind::Insert);
        self.state.set_insert_payload(payload.into());
        self
    }

    /// Turn this into an UPDATE setting `payload`. Requires a WHERE condition.
    pub fn update(mut self, payload: impl Into<Payload>) -> Self {
        self.state.set_kind(StatementKind::Update);
        self.state.set_update_payload(payload.into());
        self
    }

    /// Turn this into a DELETE. Requires a WHERE condition.
    pub fn delete(mut self) -> Self {
        self.state.set_kind(StatementKind::Delete);
        self
    }
}

impl<C: Compiler, E> QueryBuilder<C, E> {
    /// Compile the current state into SQL text and positional arguments.
    ///
    /// The builder is left untouched, so compiling twice gives identical output.
    pub fn compile(&self) -> QbResult<CompiledQuery> {
        match self.compiler.compile(&self.state) {
            Ok(compiled) => {
                tracing::trace!(
                    target: "pipehood.builder",
                    kind = self.state.kind().as_str(),
                    table = self.state.table(),
                    param_count = compiled.params.len(),
                    "compiled statement"
                );
                Ok(compiled)
            }
            Err(err) => {
                tracing::debug!(
                    target: "pipehood.builder",
                    kind = self.state.kind().as_str(),
                    table = self.state.table(),
                    error = %err,
                    "statement rejected"
                );
                Err(err)
            }
        }
    }

    /// Compile and return only the SQL text.
    pub fn to_sql(&self) -> QbResult<String> {
        self.compile().map(|compiled| compiled.sql)
    }
}

impl<C: Compiler, E: Executor> QueryBuilder<C, E> {
    /// Compile, then run the statement on the executor.
    ///
    /// Validation failures are returned before the executor is touched.
    /// Executor failures come back as [`QbError::Execution`] carrying the
    /// statement text.
    pub async fn execute(&self) -> QbResult<Vec<E::Row>> {
        let compiled = self.compile()?;
        tracing::debug!(
            target: "pipehood.builder",
            kind = self.state.kind().as_str(),
            table = self.state.table(),
            "executing"
        );
        let result = self
            .executor
            .execute(&compiled.sql, &compiled.params)
            .await;
        result.map_err(|err| QbError::execution(compiled.sql, err))
    }

    /// Execute and return the first row, if any.
    pub async fn fetch_opt(&self) -> QbResult<Option<E::Row>> {
        let rows = self.execute().await?;
        Ok(rows.into_iter().next())
    }
}

impl<C, E> Clone for QueryBuilder<C, E> {
    /// Same compiler and executor, independent copy of the state.
    fn clone(&self) -> Self {
        Self {
            compiler: Arc::clone(&self.compiler),
            executor: Arc::clone(&self.executor),
            state: self.state.clone(),
        }
    }
}

impl<C, E> std::fmt::Debug for QueryBuilder<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
