//! Execution backends.
//!
//! The builder hands compiled `(sql, params)` pairs to an [`Executor`] and
//! never looks inside it. Connection handling, pooling and transactions all
//! live behind this seam.

mod logging;
mod postgres;


pub use logging::{LogConfig, LoggingExecutor};
pub use postgres::PgExecutor;

#[cfg(feature = "pool")]
pub use postgres::PoolExecutor;

use crate::error::QbResult;
use crate::value::Value;
use std::future::Future;
use std::sync::Arc;

/// Runs compiled SQL and returns rows.
///
/// Implementations report their own failures; the builder wraps them with
/// the failing statement but does not retry or interpret them.
pub trait Executor: Send + Sync {
    /// Row type produced by this backend.
    type Row: Send;

    /// Execute `sql` with positional `params` (`$1` is `params[0]`).
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = QbResult<Vec<Self::Row>>> + Send;
}

impl<E: Executor> Executor for &E {
    type Row = E::Row;

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = QbResult<Vec<Self::Row>>> + Send {
        (**self).execute(sql, params)
    }
}

impl<E: Executor> Executor for Arc<E> {
    type Row = E::Row;

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = QbResult<Vec<Self::Row>>> + Send {
        (**self).execute(sql, params)
    }
}
