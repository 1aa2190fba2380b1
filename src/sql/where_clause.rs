//! WHERE clause rendering shared by SELECT, UPDATE and DELETE.

use crate::config::ColumnKind;
use crate::criteria::{ChainingKey, Filter, Operator};
use crate::error::QueryError;
use crate::sql::{ColumnMap, QueryBuf};
use serde_json::Value;

const DEFAULT_CHAINING: ChainingKey = ChainingKey::And;

/// PostgreSQL operator for each filter operator.
pub fn sql_operator(op: Operator) -> &'static str {
    match op {
        Operator::Equal | Operator::Default => "=",
        Operator::NotEqual => "<>",
        Operator::Greater => ">",
        Operator::GreaterOrEqual => ">=",
        Operator::Less => "<",
        Operator::LessOrEqual => "<=",
        Operator::Like => "LIKE",
        Operator::In => "IN",
        Operator::NotIn => "NOT IN",
        Operator::Contains => "ILIKE",
        Operator::NotContains => "NOT ILIKE",
        Operator::Is => "IS",
        Operator::IsNull => "IS NULL",
        Operator::IsNot => "IS NOT",
        Operator::IsNotNull => "IS NOT NULL",
    }
}

/// Translates every filter field through `columns`, then renders the clause.
/// Any unmapped field fails before SQL is produced. Arguments take the kind
/// `columns` records for their column.
pub fn where_safe(offset: usize, columns: &ColumnMap, filters: &[Filter]) -> Result<QueryBuf, QueryError> {
    let resolved = filters
        .iter()
        .map(|f| {
            columns
                .resolve(&f.field, "filter")
                .map(|column| (column, f, columns.kind(column)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(render(offset, &resolved))
}

/// Renders ` WHERE ...` using filter fields verbatim. Placeholders start at `offset + 1`.
/// Returns an empty buffer when there are no filters.
pub fn where_clause(offset: usize, filters: &[Filter]) -> QueryBuf {
    let items: Vec<(&str, &Filter, Option<ColumnKind>)> =
        filters.iter().map(|f| (f.field.as_str(), f, None)).collect();
    render(offset, &items)
}

struct Binder {
    next: usize,
    args: Vec<Value>,
    kinds: Vec<Option<ColumnKind>>,
}

impl Binder {
    fn bind(&mut self, v: Value, kind: Option<ColumnKind>) -> String {
        self.next += 1;
        self.args.push(v);
        self.kinds.push(kind);
        format!("${}", self.next)
    }
}

fn render(offset: usize, filters: &[(&str, &Filter, Option<ColumnKind>)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    if filters.is_empty() {
        return q;
    }
    let mut binder = Binder {
        next: offset,
        args: Vec::new(),
        kinds: Vec::new(),
    };
    q.sql.push_str(" WHERE ");
    for (i, (column, filter, kind)) in filters.iter().enumerate() {
        if filter.is_group_open {
            q.sql.push_str(&"(".repeat(filter.group_open_qty.max(1)));
        }
        q.sql.push_str(&predicate(column, filter, *kind, &mut binder));
        if filter.is_group_close {
            q.sql.push_str(&")".repeat(filter.group_close_qty.max(1)));
        }
        if i + 1 < filters.len() {
            let key = filter.chaining_key.unwrap_or(DEFAULT_CHAINING);
            q.sql.push(' ');
            q.sql.push_str(key.as_sql());
            q.sql.push(' ');
        }
    }
    q.args = binder.args;
    q.kinds = binder.kinds;
    q
}

fn predicate(column: &str, filter: &Filter, kind: Option<ColumnKind>, binder: &mut Binder) -> String {
    let op = sql_operator(filter.operator);
    match filter.operator {
        Operator::IsNull | Operator::IsNotNull => format!("{} {}", column, op),
        Operator::In | Operator::NotIn => {
            let values = list_values(&filter.value);
            if values.is_empty() {
                // Nothing is IN an empty list; everything is NOT IN it.
                let always = if filter.operator == Operator::In { "1 = 0" } else { "1 = 1" };
                return always.to_string();
            }
            let placeholders: Vec<String> = values.into_iter().map(|v| binder.bind(v, kind)).collect();
            format!("{} {} ({})", column, op, placeholders.join(", "))
        }
        // Patterns are text whatever the column kind.
        Operator::Contains | Operator::NotContains => {
            let pattern = Value::String(format!("%{}%", text(&filter.value)));
            let ph = binder.bind(pattern, Some(ColumnKind::Text));
            format!("{} {} {}", column, op, ph)
        }
        Operator::Like => {
            let ph = binder.bind(filter.value.clone(), Some(ColumnKind::Text));
            format!("{} {} {}", column, op, ph)
        }
        _ => {
            let ph = binder.bind(filter.value.clone(), kind);
            format!("{} {} {}", column, op, ph)
        }
    }
}

fn list_values(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
