//! SELECT compiler.

use crate::criteria::{Criteria, Filters, Pagination, Sort};
use crate::error::QueryError;
use crate::sql::{build_group_by, build_order_by, build_pagination, where_safe, ColumnMap, QueryBuf};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
        }
    }
}

/// Join clause. Table and condition are written verbatim: they must come from
/// code, never from request input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub condition: String,
}

/// Single-table SELECT with optional joins, filters, grouping, sorting and pagination.
///
/// ```
/// use criteria_sql::criteria::{Filters, Operator};
/// use criteria_sql::sql::select;
///
/// let q = select(["id", "name"])
///     .from("auth.roles")
///     .filter(Filters::by("name", Operator::Equal, "admin"))
///     .limit(10)
///     .to_sql()
///     .unwrap();
/// assert_eq!(q.sql, "SELECT id, name FROM auth.roles WHERE name = $1 LIMIT 10 OFFSET 0");
/// ```
#[derive(Clone, Debug, Default)]
pub struct SelectQuery {
    table: String,
    columns: Vec<String>,
    required_columns: Vec<String>,
    column_map: ColumnMap,
    filters: Filters,
    sorts: Vec<Sort>,
    pagination: Pagination,
    groups: Vec<String>,
    joins: Vec<Join>,
}

/// Starts a SELECT over `columns` (SQL expressions, e.g. `id` or `COUNT(*)`).
pub fn select<I, S>(columns: I) -> SelectQuery
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SelectQuery {
        columns: columns.into_iter().map(Into::into).collect(),
        ..SelectQuery::default()
    }
}

impl SelectQuery {
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Replaces the filters.
    pub fn filter(mut self, filters: impl Into<Filters>) -> Self {
        self.filters = filters.into();
        self
    }

    /// Replaces the sort keys.
    pub fn order_by(mut self, sorts: impl IntoIterator<Item = Sort>) -> Self {
        self.sorts = sorts.into_iter().collect();
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.pagination.page_size = limit;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.pagination.page_number = page;
        self
    }

    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Narrows the projection to a subset of the configured columns. Names are
    /// domain fields when a column map is set.
    pub fn required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn column_map(mut self, column_map: ColumnMap) -> Self {
        self.column_map = column_map;
        self
    }

    pub fn inner_join(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.join(JoinType::Inner, table, condition)
    }

    pub fn left_join(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.join(JoinType::Left, table, condition)
    }

    pub fn right_join(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.join(JoinType::Right, table, condition)
    }

    fn join(mut self, join_type: JoinType, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.joins.push(Join {
            join_type,
            table: table.into(),
            condition: condition.into(),
        });
        self
    }

    pub fn group_by<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Applies filters, sorts, pagination and projection from request criteria.
    pub fn criteria(self, criteria: Criteria) -> Self {
        self.filter(criteria.filters)
            .order_by(criteria.sorts)
            .pagination(criteria.pagination)
            .required_columns(criteria.select_columns)
    }

    fn projection(&self) -> Result<String, QueryError> {
        let required: HashSet<&str> = self
            .required_columns
            .iter()
            .map(|c| self.column_map.resolve(c, "projection"))
            .collect::<Result<_, _>>()?;
        let selected: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| required.contains(c))
            .collect();
        if selected.is_empty() {
            Ok(self.columns.join(", "))
        } else {
            Ok(selected.join(", "))
        }
    }

    pub fn to_sql(&self) -> Result<QueryBuf, QueryError> {
        if self.columns.is_empty() {
            return Err(QueryError::EmptyColumns);
        }
        let mut q = QueryBuf::new();
        q.sql = format!("SELECT {} FROM {}", self.projection()?, self.table);
        for join in &self.joins {
            q.sql.push_str(&format!(" {} {} ON {}", join.join_type.as_sql(), join.table, join.condition));
        }
        q.append(where_safe(0, &self.column_map, &self.filters)?);
        q.sql.push_str(&build_group_by(&self.groups, &self.column_map)?);
        q.sql.push_str(&build_order_by(&self.sorts, &self.column_map)?);
        q.sql.push_str(&build_pagination(self.pagination));
        Ok(q)
    }
}
