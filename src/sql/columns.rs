//! Domain field → SQL column whitelist.

use crate::config::ColumnKind;
use crate::error::{ConfigError, QueryError};
use std::collections::HashMap;

/// Injective mapping from API-level field names to physical SQL columns.
///
/// An empty map disables translation: fields pass through unchanged and the
/// caller is responsible for them. A non-empty map is total: any field it does
/// not contain is rejected with [`QueryError::InvalidFieldName`].
///
/// Columns may also carry a [`ColumnKind`]; compiled arguments bound against a
/// column take its kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMap {
    sql_column_by_field: HashMap<String, String>,
    kind_by_column: HashMap<String, ColumnKind>,
}

impl ColumnMap {
    pub fn empty() -> Self {
        ColumnMap::default()
    }

    /// Builds the map, rejecting repeated fields and columns claimed by two fields.
    pub fn new<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut sql_column_by_field = HashMap::new();
        let mut field_by_column: HashMap<String, String> = HashMap::new();
        for (field, column) in pairs {
            let (field, column) = (field.into(), column.into());
            if let Some(first) = field_by_column.get(&column) {
                return Err(ConfigError::DuplicateColumn {
                    column,
                    first: first.clone(),
                    second: field,
                });
            }
            if sql_column_by_field.contains_key(&field) {
                return Err(ConfigError::DuplicateField { field });
            }
            field_by_column.insert(column.clone(), field.clone());
            sql_column_by_field.insert(field, column);
        }
        Ok(ColumnMap {
            sql_column_by_field,
            kind_by_column: HashMap::new(),
        })
    }

    /// Records the kind of each SQL column.
    pub fn with_kinds<I, C>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = (C, ColumnKind)>,
        C: Into<String>,
    {
        self.kind_by_column
            .extend(kinds.into_iter().map(|(column, kind)| (column.into(), kind)));
        self
    }

    /// Kind of a SQL column, when one was recorded.
    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        self.kind_by_column.get(column).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.sql_column_by_field.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sql_column_by_field.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.sql_column_by_field.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.sql_column_by_field.contains_key(field)
    }

    /// SQL column for `field`. `context` names the clause for the error message.
    pub fn resolve<'a>(&'a self, field: &'a str, context: &'static str) -> Result<&'a str, QueryError> {
        if self.is_empty() {
            return Ok(field);
        }
        self.get(field).ok_or_else(|| {
            tracing::warn!(field, context, "field rejected by column whitelist");
            QueryError::invalid_field(field, context)
        })
    }
}
