//! Error types for pipehood

use thiserror::Error;

/// Result type alias for pipehood operations
pub type QbResult<T> = Result<T, QbError>;

/// Errors raised while compiling or executing a query.
#[derive(Debug, Error)]
pub enum QbError {
    /// The builder state cannot produce a statement (missing table, missing
    /// payload, missing WHERE on UPDATE/DELETE, placeholder/argument mismatch).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The executor failed while running a compiled statement.
    #[error("Execution failed for `{sql}`: {source}")]
    Execution {
        sql: String,
        #[source]
        source: Box<QbError>,
    },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error reported by the driver
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl QbError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap an executor failure with the statement that triggered it.
    ///
    /// An error that is already an `Execution` is returned unchanged.
    pub fn execution(sql: impl Into<String>, source: QbError) -> Self {
        match source {
            err @ Self::Execution { .. } => err,
            other => Self::Execution {
                sql: sql.into(),
                source: Box::new(other),
            },
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a wrapped execution error
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    /// Check if this is (or wraps) a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::UniqueViolation(_) => true,
            Self::Execution { source, .. } => source.is_unique_violation(),
            _ => false,
        }
    }

    /// The SQL text of the failing statement, for execution errors.
    pub fn failed_sql(&self) -> Option<&str> {
        match self {
            Self::Execution { sql, .. } => Some(sql),
            _ => None,
        }
    }

    /// Parse a tokio_postgres error into a more specific QbError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for QbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
