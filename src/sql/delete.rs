//! DELETE compiler.

use crate::criteria::Filters;
use crate::error::QueryError;
use crate::sql::{where_safe, ColumnMap, QueryBuf};

/// Builder for `DELETE FROM table WHERE ...`. Soft delete is left to the caller.
#[derive(Clone, Debug, Default)]
pub struct Delete {
    table: String,
    filters: Filters,
    column_map: ColumnMap,
    returning: Vec<String>,
}

pub fn delete_from(table: impl Into<String>) -> Delete {
    Delete {
        table: table.into(),
        ..Delete::default()
    }
}

impl Delete {
    pub fn filter(mut self, filters: impl Into<Filters>) -> Self {
        self.filters = filters.into();
        self
    }

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
        let mut q = QueryBuf::new();
        q.sql = format!("DELETE FROM {}", self.table);
        q.append(where_safe(0, &self.column_map, &self.filters)?);
        if !self.returning.is_empty() {
            q.sql.push_str(&format!(" RETURNING {}", self.returning.join(", ")));
        }
        Ok(q)
    }
}
