//! State → SQL translation.
//!
//! Every `?` marker is replaced by a `$n` reference whose ordinal is the
//! length of one running argument list after the marker's argument is pushed.
//! Numbering is global across the whole statement, so ordinals are always
//! `1..=N` and line up with the returned argument list.

use crate::error::{QbError, QbResult};
use crate::state::{Fragment, MARKER, Payload, QueryState, StatementKind};
use crate::value::Value;
use std::fmt::Write;
use tokio_postgres::types::ToSql;

/// Compiled SQL text plus its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CompiledQuery {
    pub fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }

    /// Number of `$n` references in the SQL text.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }
}

/// Translates a [`QueryState`] into a [`CompiledQuery`].
///
/// Implementations must be pure: the same state always yields the same
/// output and no state is kept between calls.
pub trait Compiler: Send + Sync {
    fn compile(&self, state: &QueryState) -> QbResult<CompiledQuery>;
}

impl<C: Compiler + ?Sized> Compiler for &C {
    fn compile(&self, state: &QueryState) -> QbResult<CompiledQuery> {
        (**self).compile(state)
    }
}

impl<C: Compiler + ?Sized> Compiler for std::sync::Arc<C> {
    fn compile(&self, state: &QueryState) -> QbResult<CompiledQuery> {
        (**self).compile(state)
    }
}

/// PostgreSQL compiler emitting `$1, $2, ...` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresCompiler;

impl PostgresCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl Compiler for PostgresCompiler {
    fn compile(&self, state: &QueryState) -> QbResult<CompiledQuery> {
        state.validate()?;

        let mut params = ParamList::new();
        let sql = match state.kind() {
            StatementKind::Select => compile_select(state, &mut params)?,
            StatementKind::Insert => compile_insert(state, &mut params),
            StatementKind::Update => compile_update(state, &mut params)?,
            StatementKind::Delete => compile_delete(state, &mut params)?,
        };

        Ok(CompiledQuery::new(sql, params.into_vec()))
    }
}

/// Running argument list shared by every clause of one statement.
#[derive(Debug, Default)]
struct ParamList {
    params: Vec<Value>,
}

impl ParamList {
    fn new() -> Self {
        Self::default()
    }

    /// Add a parameter and return its 1-based index.
    fn push(&mut self, value: Value) -> usize {
        self.params.push(value);
        self.params.len()
    }

    fn into_vec(self) -> Vec<Value> {
        self.params
    }
}

/// Resolve one fragment's markers in a single left-to-right pass.
///
/// Marker and argument counts must match exactly.
fn render_fragment(fragment: &Fragment, params: &mut ParamList) -> QbResult<String> {
    let expected = fragment.marker_count();
    let supplied = fragment.params().len();
    if expected != supplied {
        return Err(QbError::validation(format!(
            "fragment `{}` has {} placeholder(s) but {} argument(s)",
            fragment.text(),
            expected,
            supplied
        )));
    }

    let mut out = String::with_capacity(fragment.text().len() + supplied * 2);
    let mut args = fragment.params().iter();
    for ch in fragment.text().chars() {
        if ch == MARKER {
            // Counts were checked above, so an argument is always available.
            if let Some(arg) = args.next() {
                let idx = params.push(arg.clone());
                let _ = write!(out, "${}", idx);
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

fn render_where(state: &QueryState, sql: &mut String, params: &mut ParamList) -> QbResult<()> {
    if state.predicates().is_empty() {
        return Ok(());
    }

    let grouped = state.predicates().len() > 1;
    let parts = state
        .predicates()
        .iter()
        .map(|f| -> QbResult<String> {
            let rendered = render_fragment(f, params)?;
            // Fragments are opaque; group them so an OR cannot leak past AND.
            Ok(if grouped {
                format!("({})", rendered)
            } else {
                rendered
            })
        })
        .collect::<QbResult<Vec<_>>>()?;

    sql.push_str(" WHERE ");
    sql.push_str(&parts.join(" AND "));
    Ok(())
}

fn compile_select(state: &QueryState, params: &mut ParamList) -> QbResult<String> {
    let columns = if state.columns().is_empty() {
        "*".to_string()
    } else {
        state.columns().join(", ")
    };

    let mut sql = format!("SELECT {} FROM {}", columns, state.table());

    render_where(state, &mut sql, params)?;

    if !state.ordering().is_empty() {
        let order: Vec<String> = state
            .ordering()
            .iter()
            .map(|o| format!("{} {}", o.column, o.direction.as_sql()))
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.join(", "));
    }

    if let Some(limit) = state.limit() {
        let _ = write!(sql, " LIMIT {}", limit);
    }

    if let Some(offset) = state.offset() {
        let _ = write!(sql, " OFFSET {}", offset);
    }

    Ok(sql)
}

// Payload presence is checked by `QueryState::validate` before rendering.
fn compile_insert(state: &QueryState, params: &mut ParamList) -> String {
    let payload = state.insert_payload().into_iter().flat_map(Payload::iter);

    let (columns, placeholders): (Vec<&str>, Vec<String>) = payload
        .map(|(column, v)| (column, format!("${}", params.push(v.clone()))))
        .unzip();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        state.table(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn compile_update(state: &QueryState, params: &mut ParamList) -> QbResult<String> {
    let set_parts: Vec<String> = state
        .update_payload()
        .into_iter()
        .flat_map(Payload::iter)
        .map(|(column, v)| format!("{} = ${}", column, params.push(v.clone())))
        .collect();

    let mut sql = format!("UPDATE {} SET {}", state.table(), set_parts.join(", "));
    render_where(state, &mut sql, params)?;
    Ok(sql)
}

fn compile_delete(state: &QueryState, params: &mut ParamList) -> QbResult<String> {
    let mut sql = format!("DELETE FROM {}", state.table());
    render_where(state, &mut sql, params)?;
    Ok(sql)
}

/// Count `$n` references in SQL text.
pub(crate) fn count_placeholders(sql: &str) -> usize {
    placeholder_ordinals(sql).len()
}

/// Ordinals of every `$n` reference, in textual order.
pub(crate) fn placeholder_ordinals(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                if let Ok(n) = sql[start..end].parse() {
                    out.push(n);
                }
                i = end;
                continue;
            }
        }
        i += 1;
    }
    out
}
