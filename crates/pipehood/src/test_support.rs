//! In-memory executor used by unit tests.

use crate::error::{QbError, QbResult};
use crate::executor::Executor;
use crate::value::Value;
use std::sync::Mutex;

/// Records every call and answers with canned JSON rows (or a canned failure).
#[derive(Debug, Default)]
pub(crate) struct RecordingExecutor {
    rows: Vec<serde_json::Value>,
    fail_with: Option<String>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl RecordingExecutor {
    pub(crate) fn returning(rows: Vec<serde_json::Value>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Executor for RecordingExecutor {
    type Row = serde_json::Value;

    async fn execute(&self, sql: &str, params: &[Value]) -> QbResult<Vec<Self::Row>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        match &self.fail_with {
            Some(message) => Err(QbError::Other(message.clone())),
            None => Ok(self.rows.clone()),
        }
    }
}
