use super::Executor;
use crate::error::QbResult;
use crate::value::Value;
use std::time::{Duration, Instant};
use tracing::Level;

/// Logging configuration for [`LoggingExecutor`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level for the before/after events.
    pub level: Level,
    /// Truncate long SQL strings (in bytes, on a char boundary). `None` disables truncation.
    pub max_sql_length: Option<usize>,
    /// Log parameter values. When off only their types are logged.
    pub log_params: bool,
    /// Executions slower than this are reported at WARN.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            log_params: false,
            slow_query_threshold: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Include parameter values in events.
    pub fn log_params(mut self, enabled: bool) -> Self {
        self.log_params = enabled;
        self
    }

    /// Report executions slower than `threshold` at WARN.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    fn describe_params(&self, params: &[Value]) -> String {
        if self.log_params {
            format!("{:?}", params)
        } else {
            let types: Vec<&str> = params.iter().map(Value::type_name).collect();
            format!("[{}]", types.join(", "))
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            _ => tracing::trace!($($field)*),
        }
    };
}

/// Decorator that logs every statement passing through the wrapped executor.
///
/// Events use the `pipehood.sql` target. The crate never installs a
/// subscriber; the application decides where events go.
#[derive(Debug, Clone)]
pub struct LoggingExecutor<E> {
    inner: E,
    config: LogConfig,
}

impl<E: Executor> LoggingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self::with_config(inner, LogConfig::default())
    }

    pub fn with_config(inner: E, config: LogConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Executor> Executor for LoggingExecutor<E> {
    type Row = E::Row;

    async fn execute(&self, sql: &str, params: &[Value]) -> QbResult<Vec<Self::Row>> {
        let shown_sql = self.config.truncate_sql(sql);
        let shown_params = self.config.describe_params(params);
        emit_at_level!(
            self.config.level,
            target: "pipehood.sql",
            sql = %shown_sql,
            params = %shown_params,
            param_count = params.len(),
            "executing statement"
        );

        let start = Instant::now();
        let result = self.inner.execute(sql, params).await;
        let elapsed = start.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        match &result {
            Ok(rows) => {
                let slow = self
                    .config
                    .slow_query_threshold
                    .is_some_and(|threshold| elapsed >= threshold);
                if slow {
                    tracing::warn!(
                        target: "pipehood.sql",
                        sql = %shown_sql,
                        rows = rows.len(),
                        elapsed_ms,
                        "slow statement"
                    );
                } else {
                    emit_at_level!(
                        self.config.level,
                        target: "pipehood.sql",
                        rows = rows.len(),
                        elapsed_ms,
                        "statement finished"
                    );
                }
            }
            Err(err) => {
                tracing::warn!(
                    target: "pipehood.sql",
                    sql = %shown_sql,
                    error = %err,
                    elapsed_ms,
                    "statement failed"
                );
            }
        }

        result
    }
}
