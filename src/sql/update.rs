//! UPDATE compiler.

use crate::criteria::Filters;
use crate::error::QueryError;
use crate::sql::{where_safe, ColumnMap, QueryBuf};
use serde_json::Value;

/// Builder for `UPDATE table SET ... WHERE ...`.
///
/// Values are `Option<Value>`: `None` is an absent value and `Some(Value::Null)`
/// an explicit null. In partial mode absent values drop their SET entry;
/// otherwise they are written as NULL.
#[derive(Clone, Debug, Default)]
pub struct Update {
    table: String,
    columns: Vec<String>,
    values: Vec<Option<Value>>,
    partial: bool,
    filters: Filters,
    column_map: ColumnMap,
    returning: Vec<String>,
}

pub fn update(table: impl Into<String>) -> Update {
    Update {
        table: table.into(),
        ..Update::default()
    }
}

impl Update {
    /// SQL column names, positionally matched with [`Update::with_values`].
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_values(mut self, values: Vec<Option<Value>>) -> Self {
        self.values = values;
        self
    }

    pub fn with_partial_update(mut self) -> Self {
        self.partial = true;
        self
    }

    pub fn filter(mut self, filters: impl Into<Filters>) -> Self {
        self.filters = filters.into();
        self
    }

    /// Whitelist applied to WHERE fields. Its column kinds also type the SET values.
    pub fn column_map(mut self, column_map: ColumnMap) -> Self {
        self.column_map = column_map;
        self
    }

    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_sql(&self) -> Result<QueryBuf, QueryError> {
        if self.columns.len() != self.values.len() {
            return Err(QueryError::ColumnCountMismatch {
                expected: self.columns.len(),
                got: self.values.len(),
            });
        }
        let mut q = QueryBuf::new();
        let mut sets = Vec::with_capacity(self.columns.len());
        for (column, value) in self.columns.iter().zip(&self.values) {
            let value = match value {
                Some(v) => v.clone(),
                None if self.partial => continue,
                None => Value::Null,
            };
            let ph = q.push_arg(value, self.column_map.kind(column));
            sets.push(format!("{} = {}", column, ph));
        }
        if sets.is_empty() {
            return Err(QueryError::EmptyColumns);
        }
        q.sql = format!("UPDATE {} SET {}", self.table, sets.join(", "));
        q.append(where_safe(q.args.len(), &self.column_map, &self.filters)?);
        if !self.returning.is_empty() {
            q.sql.push_str(&format!(" RETURNING {}", self.returning.join(", ")));
        }
        Ok(q)
    }
}
