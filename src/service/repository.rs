//! Table-level operations built from criteria and run through an [`Executor`].

use crate::config::{coerce_value, ResolvedTable};
use crate::criteria::{Criteria, Filters, Pagination};
use crate::error::{AppError, QueryError};
use crate::service::Executor;
use crate::sql::{delete_from, insert_into, select, update};
use serde_json::{Map, Value};

/// Count column alias in `count` queries.
const COUNT_ALIAS: &str = "total";

/// Pass-through repository over one configured table. Rows are returned keyed by
/// API field name.
pub struct TableRepository<'a> {
    executor: &'a dyn Executor,
    table: &'a ResolvedTable,
    max_page_size: Option<u32>,
}

impl<'a> TableRepository<'a> {
    pub fn new(executor: &'a dyn Executor, table: &'a ResolvedTable) -> Self {
        TableRepository {
            executor,
            table,
            max_page_size: None,
        }
    }

    pub fn with_max_page_size(mut self, max: Option<u32>) -> Self {
        self.max_page_size = max;
        self
    }

    pub async fn list(&self, criteria: Criteria) -> Result<Vec<Value>, AppError> {
        let mut criteria = self.table.coerce_criteria(criteria)?;
        if let Some(max) = self.max_page_size {
            criteria.pagination = criteria.pagination.clamped(max);
        }
        let q = self.table.select().criteria(criteria).to_sql()?;
        let rows = self.executor.fetch_all(&q).await?;
        Ok(rows.into_iter().map(|r| self.to_api_row(r)).collect())
    }

    /// First row matching the criteria.
    pub async fn find(&self, criteria: Criteria) -> Result<Option<Value>, AppError> {
        let criteria = self.table.coerce_criteria(criteria)?;
        let q = self
            .table
            .select()
            .criteria(criteria)
            .pagination(Pagination::new(0, 1))
            .to_sql()?;
        let row = self.executor.fetch_optional(&q).await?;
        Ok(row.map(|r| self.to_api_row(r)))
    }

    pub async fn exists(&self, criteria: Criteria) -> Result<bool, AppError> {
        let criteria = self.table.coerce_criteria(criteria)?;
        let q = select(["1"])
            .from(self.table.qualified_name.as_str())
            .column_map(self.table.column_map.clone())
            .filter(criteria.filters)
            .limit(1)
            .to_sql()?;
        Ok(self.executor.fetch_optional(&q).await?.is_some())
    }

    /// Rows matching the criteria filters. Sorts and pagination are ignored.
    pub async fn count(&self, criteria: Criteria) -> Result<i64, AppError> {
        let criteria = self.table.coerce_criteria(criteria)?;
        let q = select([format!("COUNT(*) AS {}", COUNT_ALIAS)])
            .from(self.table.qualified_name.as_str())
            .column_map(self.table.column_map.clone())
            .filter(criteria.filters)
            .to_sql()?;
        let row = self.executor.fetch_optional(&q).await?;
        Ok(row
            .and_then(|r| r.get(COUNT_ALIAS).and_then(Value::as_i64))
            .unwrap_or(0))
    }

    /// Inserts one row given as `{ field: value }` and returns it.
    pub async fn create(&self, values: Map<String, Value>) -> Result<Option<Value>, AppError> {
        let (columns, row) = self.columns_and_values(values, "insert")?;
        let q = insert_into(self.table.qualified_name.as_str())
            .with_columns(columns)
            .with_values(row)
            .column_map(self.table.column_map.clone())
            .returning(self.table.column_names())
            .to_sql()?;
        let row = self.executor.fetch_optional(&q).await?;
        Ok(row.map(|r| self.to_api_row(r)))
    }

    /// Inserts several rows in one statement. Every row must carry the same fields.
    pub async fn create_bulk(&self, rows: Vec<Map<String, Value>>) -> Result<Vec<Value>, AppError> {
        let mut rows = rows.into_iter();
        let Some(first) = rows.next() else {
            return Ok(Vec::new());
        };
        let fields: Vec<String> = first.keys().cloned().collect();
        let (columns, values) = self.columns_and_values(first, "insert")?;
        let mut insert = insert_into(self.table.qualified_name.as_str())
            .with_columns(columns)
            .with_values(values);
        for mut row in rows {
            let got = row.len();
            let mut values = Vec::with_capacity(fields.len());
            for field in &fields {
                let value = row.remove(field).ok_or(QueryError::ColumnCountMismatch {
                    expected: fields.len(),
                    got,
                })?;
                values.push(self.coerce(field, value)?);
            }
            if !row.is_empty() {
                return Err(QueryError::ColumnCountMismatch {
                    expected: fields.len(),
                    got,
                }
                .into());
            }
            insert = insert.with_values(values);
        }
        let q = insert
            .column_map(self.table.column_map.clone())
            .returning(self.table.column_names())
            .to_sql()?;
        let rows = self.executor.fetch_all(&q).await?;
        Ok(rows.into_iter().map(|r| self.to_api_row(r)).collect())
    }

    /// Partial update: only fields present in `values` are written (JSON null
    /// writes NULL). Refuses to run without filters.
    pub async fn update(&self, mut values: Map<String, Value>, filters: Filters) -> Result<Vec<Value>, AppError> {
        if filters.is_empty() {
            return Err(AppError::BadRequest("update requires at least one filter".into()));
        }
        if let Some(unknown) = values.keys().find(|f| self.table.column_by_field(f).is_none()) {
            return Err(QueryError::invalid_field(unknown.as_str(), "update").into());
        }
        let mut set = Vec::with_capacity(self.table.columns.len());
        for column in &self.table.columns {
            let value = match values.remove(&column.field) {
                Some(v) => Some(coerce_value(&column.field, column.kind, v)?),
                None => None,
            };
            set.push(value);
        }
        let q = update(self.table.qualified_name.as_str())
            .with_columns(self.table.column_names())
            .with_values(set)
            .with_partial_update()
            .filter(self.table.coerce_filters(filters)?)
            .column_map(self.table.column_map.clone())
            .returning(self.table.column_names())
            .to_sql()?;
        let rows = self.executor.fetch_all(&q).await?;
        Ok(rows.into_iter().map(|r| self.to_api_row(r)).collect())
    }

    /// Hard delete; returns rows affected. Refuses to run without filters.
    pub async fn delete(&self, filters: Filters) -> Result<u64, AppError> {
        if filters.is_empty() {
            return Err(AppError::BadRequest("delete requires at least one filter".into()));
        }
        let q = delete_from(self.table.qualified_name.as_str())
            .filter(self.table.coerce_filters(filters)?)
            .column_map(self.table.column_map.clone())
            .to_sql()?;
        self.executor.execute(&q).await
    }

    fn coerce(&self, field: &str, value: Value) -> Result<Value, QueryError> {
        match self.table.column_by_field(field) {
            Some(column) => coerce_value(field, column.kind, value),
            None => Err(QueryError::invalid_field(field, "insert")),
        }
    }

    fn columns_and_values(
        &self,
        values: Map<String, Value>,
        context: &'static str,
    ) -> Result<(Vec<String>, Vec<Value>), QueryError> {
        let mut columns = Vec::with_capacity(values.len());
        let mut row = Vec::with_capacity(values.len());
        for (field, value) in values {
            let column = self
                .table
                .column_by_field(&field)
                .ok_or_else(|| QueryError::invalid_field(field.as_str(), context))?;
            row.push(coerce_value(&field, column.kind, value)?);
            columns.push(column.name.clone());
        }
        Ok((columns, row))
    }

    /// Renames SQL column keys to API field names.
    fn to_api_row(&self, row: Value) -> Value {
        let Value::Object(mut cells) = row else {
            return row;
        };
        let mut out = Map::with_capacity(cells.len());
        for column in &self.table.columns {
            if let Some(v) = cells.remove(&column.name) {
                out.insert(column.field.clone(), v);
            }
        }
        out.extend(cells);
        Value::Object(out)
    }
}
