//! Config validation: identifiers, duplicates and limits.

use crate::config::QueryConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

/// PostgreSQL's default NAMEDATALEN - 1.
const MAX_IDENTIFIER_LENGTH: usize = 63;

pub fn validate(config: &QueryConfig) -> Result<(), ConfigError> {
    let ident = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| ConfigError::Validation(e.to_string()))?;
    let check = |s: &str| -> Result<(), ConfigError> {
        if s.len() > MAX_IDENTIFIER_LENGTH || !ident.is_match(s) {
            return Err(ConfigError::InvalidIdentifier(s.to_string()));
        }
        Ok(())
    };

    if config.max_page_size == Some(0) {
        return Err(ConfigError::Validation("max_page_size must be greater than 0".into()));
    }

    let mut names = HashSet::new();
    for t in &config.tables {
        check(&t.name)?;
        if let Some(schema) = &t.schema {
            check(schema)?;
        }
        if !names.insert(t.name.as_str()) {
            return Err(ConfigError::DuplicateTable(t.name.clone()));
        }
        if t.columns.is_empty() {
            return Err(ConfigError::Validation(format!("table {} has no columns", t.name)));
        }

        let mut columns = HashSet::new();
        let mut fields = HashSet::new();
        for c in &t.columns {
            check(&c.name)?;
            let field = c.field_name();
            check(&field)?;
            if !columns.insert(c.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "column {} listed twice in table {}",
                    c.name, t.name
                )));
            }
            if !fields.insert(field.clone()) {
                return Err(ConfigError::DuplicateField { field });
            }
        }
    }
    Ok(())
}
