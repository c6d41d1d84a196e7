//! The value object a builder accumulates before compilation.

use crate::error::{QbError, QbResult};
use crate::value::Value;
use indexmap::IndexMap;

/// Placeholder marker recognised in fragment templates.
pub const MARKER: char = '?';

/// Statement kind, selecting the compiler branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One ORDER BY element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

/// A predicate template plus the arguments its `?` markers consume, in order.
///
/// Markers are resolved to `$n` only at compile time, so the same fragment
/// can land at any position in the final statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    text: String,
    params: Vec<Value>,
}

impl Fragment {
    pub fn new(text: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Number of `?` markers in the template.
    pub fn marker_count(&self) -> usize {
        self.text.chars().filter(|&c| c == MARKER).count()
    }
}

/// Column → value mapping for INSERT and UPDATE.
///
/// Iteration follows insertion order. Setting an existing column replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    values: IndexMap<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value (chainable).
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// Build a payload from any serializable struct or map.
    ///
    /// Field order follows serialization order. Anything that does not
    /// serialize to a JSON object is rejected.
    pub fn from_serializable<T: serde::Serialize + ?Sized>(value: &T) -> QbResult<Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| QbError::validation(format!("payload is not serializable: {}", e)))?;
        match json {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from_json(v)))
                .collect()),
            other => Err(QbError::validation(format!(
                "payload must serialize to an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (k, v) in iter {
            payload.insert(k, v);
        }
        payload
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Payload {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Everything needed to produce one statement.
///
/// Owned by exactly one builder; `Clone` copies every collection, so a cloned
/// state never observes mutations of the original.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    table: String,
    kind: StatementKind,
    columns: Vec<String>,
    predicates: Vec<Fragment>,
    ordering: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    insert_payload: Option<Payload>,
    update_payload: Option<Payload>,
}

impl QueryState {
    /// An empty SELECT state with no table.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn predicates(&self) -> &[Fragment] {
        &self.predicates
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.ordering
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn insert_payload(&self) -> Option<&Payload> {
        self.insert_payload.as_ref()
    }

    pub fn update_payload(&self) -> Option<&Payload> {
        self.update_payload.as_ref()
    }

    /// Check the per-kind invariants without producing any SQL.
    pub fn validate(&self) -> QbResult<()> {
        if self.table.is_empty() {
            return Err(QbError::validation("table is required"));
        }

        match self.kind {
            StatementKind::Select => {}
            StatementKind::Insert => {
                if self.insert_payload.as_ref().is_none_or(Payload::is_empty) {
                    return Err(QbError::validation("INSERT requires a non-empty payload"));
                }
            }
            StatementKind::Update => {
                if self.update_payload.as_ref().is_none_or(Payload::is_empty) {
                    return Err(QbError::validation("UPDATE requires a non-empty payload"));
                }
                if self.predicates.is_empty() {
                    return Err(QbError::validation(
                        "UPDATE requires at least one WHERE condition",
                    ));
                }
            }
            StatementKind::Delete => {
                if self.predicates.is_empty() {
                    return Err(QbError::validation(
                        "DELETE requires at least one WHERE condition",
                    ));
                }
            }
        }

        Ok(())
    }

    // ==================== crate-private mutation ====================

    pub(crate) fn set_table(&mut self, table: String) {
        self.table = table;
    }

    pub(crate) fn set_kind(&mut self, kind: StatementKind) {
        self.kind = kind;
    }

    pub(crate) fn push_column(&mut self, column: String) {
        self.columns.push(column);
    }

    pub(crate) fn push_predicate(&mut self, fragment: Fragment) {
        self.predicates.push(fragment);
    }

    pub(crate) fn push_order(&mut self, column: String, direction: SortDirection) {
        self.ordering.push(OrderBy { column, direction });
    }

    pub(crate) fn set_limit(&mut self, n: u64) {
        self.limit = Some(n);
    }

    pub(crate) fn set_offset(&mut self, n: u64) {
        self.offset = Some(n);
    }

    pub(crate) fn set_insert_payload(&mut self, payload: Payload) {
        self.insert_payload = Some(payload);
    }

    pub(crate) fn set_update_payload(&mut self, payload: Payload) {
        self.update_payload = Some(payload);
    }
}
