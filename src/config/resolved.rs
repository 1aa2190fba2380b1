//! Resolved table model: config validated and flattened for runtime use.

use crate::config::ColumnKind;
use crate::criteria::{Criteria, Filter, Filters, Operator};
use crate::error::QueryError;
use crate::sql::{select, ColumnMap, SelectQuery};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use serde_json::{Number, Value};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedColumn {
    /// SQL column name.
    pub name: String,
    /// API field name.
    pub field: String,
    pub kind: ColumnKind,
}

#[derive(Clone, Debug)]
pub struct ResolvedTable {
    pub name: String,
    /// Schema-qualified name used in FROM / INTO clauses.
    pub qualified_name: String,
    pub columns: Vec<ResolvedColumn>,
    pub column_map: ColumnMap,
}

impl ResolvedTable {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_by_field(&self, field: &str) -> Option<&ResolvedColumn> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// SELECT over every configured column, whitelisted by this table's field map.
    pub fn select(&self) -> SelectQuery {
        select(self.column_names())
            .from(self.qualified_name.as_str())
            .column_map(self.column_map.clone())
    }

    /// Converts parser-produced string values to each column's kind.
    /// Fields not in the table are left alone; the compiler rejects them.
    pub fn coerce_criteria(&self, mut criteria: Criteria) -> Result<Criteria, QueryError> {
        criteria.filters = self.coerce_filters(criteria.filters)?;
        Ok(criteria)
    }

    pub fn coerce_filters(&self, filters: Filters) -> Result<Filters, QueryError> {
        filters.into_iter().map(|f| self.coerce_filter(f)).collect()
    }

    fn coerce_filter(&self, mut filter: Filter) -> Result<Filter, QueryError> {
        match filter.operator {
            Operator::IsNull | Operator::IsNotNull | Operator::Contains | Operator::NotContains | Operator::Like => {
                return Ok(filter)
            }
            _ => {}
        }
        if let Some(column) = self.column_by_field(&filter.field) {
            filter.value = coerce_value(&filter.field, column.kind, filter.value)?;
        }
        Ok(filter)
    }
}

/// Coerces a string (or list of strings) into `kind`. Non-string scalars pass
/// through unless they contradict the kind.
pub fn coerce_value(field: &str, kind: ColumnKind, value: Value) -> Result<Value, QueryError> {
    let invalid = |v: &Value| QueryError::InvalidValue {
        field: field.to_string(),
        kind: kind.as_str(),
        value: match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };
    if kind == ColumnKind::Json {
        return Ok(value);
    }
    match value {
        Value::Null => Ok(Value::Null),
        Value::Array(items) => items
            .into_iter()
            .map(|v| coerce_value(field, kind, v))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::String(s) => {
            let coerced = match kind {
                ColumnKind::Text | ColumnKind::Json => Some(Value::String(s.clone())),
                ColumnKind::Int => s.trim().parse::<i64>().ok().map(Value::from),
                ColumnKind::Float => s.trim().parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number),
                ColumnKind::Bool => match s.to_ascii_lowercase().as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                ColumnKind::Uuid => uuid::Uuid::parse_str(&s).ok().map(|u| Value::String(u.to_string())),
                ColumnKind::Timestamp => parse_timestamp(&s).map(Value::String),
            };
            coerced.ok_or_else(|| invalid(&Value::String(s)))
        }
        Value::Number(n) => match kind {
            ColumnKind::Int if n.as_i64().is_none() => Err(invalid(&Value::Number(n))),
            ColumnKind::Int | ColumnKind::Float => Ok(Value::Number(n)),
            ColumnKind::Text => Ok(Value::String(n.to_string())),
            _ => Err(invalid(&Value::Number(n))),
        },
        Value::Bool(b) => match kind {
            ColumnKind::Bool => Ok(Value::Bool(b)),
            ColumnKind::Text => Ok(Value::String(b.to_string())),
            _ => Err(invalid(&Value::Bool(b))),
        },
        obj @ Value::Object(_) => Err(invalid(&obj)),
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD` (midnight UTC), as RFC 3339.
fn parse_timestamp(s: &str) -> Option<String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))?;
    Some(naive.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

#[derive(Clone, Debug, Default)]
pub struct ResolvedModel {
    pub tables: Vec<ResolvedTable>,
    pub table_by_name: HashMap<String, ResolvedTable>,
    pub max_page_size: Option<u32>,
}

impl ResolvedModel {
    pub fn table(&self, name: &str) -> Option<&ResolvedTable> {
        self.table_by_name.get(name)
    }
}
