#![allow(dead_code)]

use pipehood::{Executor, QbError, QbResult, QueryBuilderFactory, PostgresCompiler, Value};
use std::sync::Mutex;

/// Captures every `(sql, params)` pair it is asked to run.
#[derive(Debug, Default)]
pub struct CaptureExecutor {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    fail: bool,
}

impl CaptureExecutor {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Executor for CaptureExecutor {
    type Row = usize;

    async fn execute(&self, sql: &str, params: &[Value]) -> QbResult<Vec<usize>> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((sql.to_string(), params.to_vec()));
        if self.fail {
            return Err(QbError::Other("backend unavailable".to_string()));
        }
        // One row per bound parameter, enough to tell calls apart.
        Ok((0..params.len()).collect())
    }
}

pub fn factory() -> QueryBuilderFactory<PostgresCompiler, CaptureExecutor> {
    QueryBuilderFactory::postgres(CaptureExecutor::default())
}

/// `$n` ordinals in order of appearance.
pub fn ordinals(sql: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let mut rest = sql;
    while let Some(pos) = rest.find('$') {
        rest = &rest[pos + 1..];
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if let Ok(n) = digits.parse() {
            out.push(n);
        }
    }
    out
}
