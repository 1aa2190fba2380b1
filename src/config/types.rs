//! Raw config types matching the JSON config file.

use crate::case::to_camel_case;
use crate::criteria::DEFAULT_RESERVED_KEYS;
use serde::{Deserialize, Serialize};

/// Top-level query config: which tables are exposed and under which field names.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Query-string keys the parser skips (framework-owned parameters).
    #[serde(default = "default_reserved_keys")]
    pub reserved_keys: Vec<String>,
    /// Upper bound applied to `limit` on list endpoints.
    #[serde(default)]
    pub max_page_size: Option<u32>,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            reserved_keys: default_reserved_keys(),
            max_page_size: None,
            tables: Vec::new(),
        }
    }
}

fn default_reserved_keys() -> Vec<String> {
    DEFAULT_RESERVED_KEYS.iter().map(|k| k.to_string()).collect()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub columns: Vec<ColumnConfig>,
}

impl TableConfig {
    /// `schema.name`, or `name` when no schema is set.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// SQL column name.
    pub name: String,
    /// API field name; defaults to the camelCase form of `name`.
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub kind: ColumnKind,
}

impl ColumnConfig {
    pub fn field_name(&self) -> String {
        self.field.clone().unwrap_or_else(|| to_camel_case(&self.name))
    }
}

/// Value kind of a column, used to coerce query-string values before binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Int,
    Float,
    Bool,
    Uuid,
    Timestamp,
    Json,
}

impl ColumnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Int => "int",
            ColumnKind::Float => "float",
            ColumnKind::Bool => "bool",
            ColumnKind::Uuid => "uuid",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::Json => "json",
        }
    }
}
