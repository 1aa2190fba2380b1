//! INSERT compiler.

use crate::error::QueryError;
use crate::sql::{ColumnMap, QueryBuf};
use serde_json::Value;

/// Builder for single and multi-row INSERT statements.
#[derive(Clone, Debug, Default)]
pub struct Insert {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    column_map: ColumnMap,
    returning: Vec<String>,
}

pub fn insert_into(table: impl Into<String>) -> Insert {
    Insert {
        table: table.into(),
        ..Insert::default()
    }
}

impl Insert {
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one row. Call repeatedly for a bulk insert.
    pub fn with_values(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    /// Supplies the kind of each column for binding. Columns are SQL names and
    /// are not whitelisted here.
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
        if self.columns.is_empty() {
            return Err(QueryError::EmptyColumns);
        }
        if self.rows.is_empty() {
            return Err(QueryError::ColumnCountMismatch {
                expected: self.columns.len(),
                got: 0,
            });
        }
        let mut q = QueryBuf::new();
        let mut tuples = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if row.len() != self.columns.len() {
                return Err(QueryError::ColumnCountMismatch {
                    expected: self.columns.len(),
                    got: row.len(),
                });
            }
            let placeholders: Vec<String> = self
                .columns
                .iter()
                .zip(row)
                .map(|(column, v)| q.push_arg(v.clone(), self.column_map.kind(column)))
                .collect();
            tuples.push(format!("({})", placeholders.join(", ")));
        }
        q.sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            self.columns.join(", "),
            tuples.join(", ")
        );
        if !self.returning.is_empty() {
            q.sql.push_str(&format!(" RETURNING {}", self.returning.join(", ")));
        }
        Ok(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_row() {
        let q = insert_into("auth.roles")
            .with_columns(["code", "name"])
            .with_values(vec![json!("admin"), json!("Administrator")])
            .to_sql()
            .unwrap();
        assert_eq!(q.sql, "INSERT INTO auth.roles (code, name) VALUES ($1, $2)");
        assert_eq!(q.args, vec![json!("admin"), json!("Administrator")]);
    }

    #[test]
    fn bulk_rows_number_placeholders_sequentially() {
        let q = insert_into("t")
            .with_columns(["a", "b"])
            .with_values(vec![json!(1), json!(2)])
            .with_values(vec![json!(3), json!(4)])
            .returning(["id"])
            .to_sql()
            .unwrap();
        assert_eq!(q.sql, "INSERT INTO t (a, b) VALUES ($1, $2), ($3, $4) RETURNING id");
        assert_eq!(q.args.len(), 4);
    }

    #[test]
    fn values_take_column_kinds() {
        use crate::config::ColumnKind;
        let map = ColumnMap::empty().with_kinds([("id", ColumnKind::Uuid), ("note", ColumnKind::Text)]);
        let q = insert_into("t")
            .with_columns(["id", "note", "extra"])
            .with_values(vec![json!("a"), json!("b"), json!("c")])
            .column_map(map)
            .to_sql()
            .unwrap();
        assert_eq!(q.kinds, vec![Some(ColumnKind::Uuid), Some(ColumnKind::Text), None]);
    }

    #[test]
    fn rejects_bad_shapes() {
        let no_cols: [&str; 0] = [];
        assert!(matches!(
            insert_into("t").with_columns(no_cols).with_values(vec![json!(1)]).to_sql(),
            Err(QueryError::EmptyColumns)
        ));
        assert!(matches!(
            insert_into("t").with_columns(["a"]).to_sql(),
            Err(QueryError::ColumnCountMismatch { expected: 1, got: 0 })
        ));
        assert!(matches!(
            insert_into("t")
                .with_columns(["a", "b"])
                .with_values(vec![json!(1), json!(2)])
                .with_values(vec![json!(3)])
                .to_sql(),
            Err(QueryError::ColumnCountMismatch { expected: 2, got: 1 })
        ));
    }
}
