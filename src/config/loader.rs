//! Load config from JSON text or a file, and resolve it for runtime use.

use crate::config::resolved::{ResolvedColumn, ResolvedModel, ResolvedTable};
use crate::config::{validate, QueryConfig};
use crate::criteria::QueryParser;
use crate::error::ConfigError;
use crate::sql::ColumnMap;
use std::collections::HashMap;
use std::path::Path;

pub fn load_from_str(json: &str) -> Result<QueryConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<QueryConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded query config");
    load_from_str(&text)
}

/// Build resolved model from config. Validates first.
pub fn resolve(config: &QueryConfig) -> Result<ResolvedModel, ConfigError> {
    validate(config)?;

    let mut tables = Vec::with_capacity(config.tables.len());
    let mut table_by_name = HashMap::new();
    for t in &config.tables {
        let columns: Vec<ResolvedColumn> = t
            .columns
            .iter()
            .map(|c| ResolvedColumn {
                name: c.name.clone(),
                field: c.field_name(),
                kind: c.kind,
            })
            .collect();
        let column_map = ColumnMap::new(columns.iter().map(|c| (c.field.clone(), c.name.clone())))?
            .with_kinds(columns.iter().map(|c| (c.name.clone(), c.kind)));
        let table = ResolvedTable {
            name: t.name.clone(),
            qualified_name: t.qualified_name(),
            columns,
            column_map,
        };
        table_by_name.insert(table.name.clone(), table.clone());
        tables.push(table);
    }
    tracing::info!(tables = tables.len(), "query model resolved");

    Ok(ResolvedModel {
        tables,
        table_by_name,
        max_page_size: config.max_page_size,
    })
}

impl QueryConfig {
    /// Query-string parser honoring this config's reserved keys.
    pub fn parser(&self) -> QueryParser {
        QueryParser::with_reserved_keys(self.reserved_keys.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnKind;

    const ROLES: &str = r#"{
        "max_page_size": 100,
        "tables": [{
            "name": "roles",
            "schema": "auth",
            "columns": [
                {"name": "id", "kind": "uuid"},
                {"name": "code"},
                {"name": "created_at", "kind": "timestamp"},
                {"name": "role_name", "field": "name"}
            ]
        }]
    }"#;

    #[test]
    fn resolves_tables_and_fields() {
        let model = resolve(&load_from_str(ROLES).unwrap()).unwrap();
        let roles = model.table("roles").unwrap();
        assert_eq!(roles.qualified_name, "auth.roles");
        assert_eq!(roles.column_map.get("createdAt"), Some("created_at"));
        assert_eq!(roles.column_map.get("name"), Some("role_name"));
        assert_eq!(roles.column_by_field("id").map(|c| c.kind), Some(ColumnKind::Uuid));
        assert_eq!(model.max_page_size, Some(100));
        assert!(model.table("users").is_none());
    }

    #[test]
    fn default_reserved_keys() {
        let cfg = load_from_str("{}").unwrap();
        assert_eq!(cfg.reserved_keys, vec!["datastar".to_string()]);
        assert!(cfg.parser().is_reserved("datastar"));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(load_from_str("{"), Err(ConfigError::Load(_))));
        assert!(matches!(load_from_path("/nonexistent/criteria.json"), Err(ConfigError::Load(_))));
    }

    #[test]
    fn non_injective_fields_fail_to_resolve() {
        let cfg = load_from_str(
            r#"{"tables":[{"name":"t","columns":[{"name":"a","field":"x"},{"name":"b","field":"x"}]}]}"#,
        )
        .unwrap();
        assert!(resolve(&cfg).is_err());
    }
}
