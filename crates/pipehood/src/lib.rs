//! # pipehood
//!
//! A fluent, parameterized PostgreSQL query builder.
//!
//! A [`QueryBuilder`] accumulates a statement's shape (table, columns, WHERE
//! fragments, ordering, pagination, INSERT/UPDATE payloads) and hands it to a
//! [`Compiler`], which produces SQL text with `$1, $2, ...` placeholders plus
//! the matching argument list. [`execute`](QueryBuilder::execute) passes that
//! pair to an [`Executor`].
//!
//! ## Features
//!
//! - **Global placeholder numbering**: `?` markers in any fragment become
//!   `$n` in one left-to-right pass, so ordinals are always `1..=N`
//! - **Safe defaults**: DELETE and UPDATE require a WHERE condition, INSERT and
//!   UPDATE require a payload, an empty `IN` list matches nothing
//! - **Pluggable backends**: compiler and executor are traits wired in by a
//!   [`QueryBuilderFactory`]
//! - **Independent clones**: cloning a builder copies its state; both copies
//!   keep the same compiler and executor
//!
//! ## Example
//!
//! ```ignore
//! use pipehood::{Payload, PoolExecutor, QueryBuilderFactory, create_pool};
//!
//! let factory = QueryBuilderFactory::postgres(PoolExecutor::new(create_pool(&url)?));
//!
//! // SELECT id, name FROM users WHERE status IN ($1, $2) ORDER BY created_at DESC LIMIT 10
//! let rows = factory
//!     .create()
//!     .table("users")
//!     .select(["id", "name"])
//!     .where_in("status", ["active", "pending"])
//!     .order_by_desc("created_at")
//!     .limit(10)
//!     .execute()
//!     .await?;
//!
//! // UPDATE users SET name = $1 WHERE id = $2
//! factory
//!     .create()
//!     .table("users")
//!     .update(Payload::new().set("name", "X"))
//!     .where_eq("id", 1i64)
//!     .execute()
//!     .await?;
//! ```

pub mod builder;
pub mod client;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod factory;
pub mod state;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(test)]
mod test_support;

pub use builder::QueryBuilder;
pub use client::GenericClient;
pub use compiler::{CompiledQuery, Compiler, PostgresCompiler};
pub use error::{QbError, QbResult};
pub use executor::{Executor, LogConfig, LoggingExecutor, PgExecutor};
pub use factory::QueryBuilderFactory;
pub use state::{Fragment, OrderBy, Payload, QueryState, SortDirection, StatementKind};
pub use value::Value;

#[cfg(feature = "pool")]
pub use executor::PoolExecutor;

#[cfg(feature = "pool")]
pub use pool::{PoolConfig, create_pool, create_pool_with_config, create_pool_with_tls};

// Re-exported so executor implementations can name driver types without a
// separate dependency.
pub use tokio_postgres;
