use crate::config::ColumnKind;
use serde::Serialize;
use serde_json::Value;

/// Compiled statement: SQL text with `$n` placeholders and the positional args.
///
/// `kinds` runs parallel to `args` and carries the column kind each argument is
/// compared against or written to, when known. The executor binds by kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QueryBuf {
    pub sql: String,
    pub args: Vec<Value>,
    pub kinds: Vec<Option<ColumnKind>>,
}

impl QueryBuf {
    pub fn new() -> Self {
        QueryBuf::default()
    }

    /// Statement without arguments.
    pub fn raw(sql: impl Into<String>) -> Self {
        QueryBuf {
            sql: sql.into(),
            ..QueryBuf::default()
        }
    }

    /// Kind of the argument at `idx` (0-based), if one was recorded.
    pub fn kind_at(&self, idx: usize) -> Option<ColumnKind> {
        self.kinds.get(idx).copied().flatten()
    }

    /// Binds `v` as the next argument and returns its placeholder (`$n`).
    pub(crate) fn push_arg(&mut self, v: Value, kind: Option<ColumnKind>) -> String {
        self.args.push(v);
        self.kinds.push(kind);
        format!("${}", self.args.len())
    }

    /// Appends another fragment, taking over its args. The fragment must have
    /// been numbered starting after this buffer's args.
    pub(crate) fn append(&mut self, other: QueryBuf) {
        self.sql.push_str(&other.sql);
        self.args.extend(other.args);
        self.kinds.extend(other.kinds);
    }
}
