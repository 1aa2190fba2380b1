//! Request-parameter parser for the criteria mini-language.
//!
//! | Parameter | Meaning |
//! |---|---|
//! | `field=<op>:<value>` | filter, joined to the next one with AND |
//! | `field=<op>:<value>:<and\|or>` | filter with an explicit chaining key |
//! | `field=<and\|or>:<op>:<value>` | filter that rewrites how the previous one chains to it |
//! | `field=sort:<asc\|desc>` | sort key |
//! | `any=page:<n>` / `any=limit:<n>` | pagination |
//!
//! `in` and `nin` values are comma-separated lists. Unknown operator tokens fall
//! back to `eq`; the only hard failure is a non-integer page or limit.

use crate::criteria::{ChainingKey, Criteria, Direction, Filter, Operator, Pagination, Sort};
use crate::error::QueryError;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};

const PARAMETER_PAGE: &str = "page";
const PARAMETER_LIMIT: &str = "limit";
const PARAMETER_SORT: &str = "sort";
const DEFAULT_CHAINING: ChainingKey = ChainingKey::And;
const MAX_PARTS: usize = 4;

/// Keys skipped by default (client-framework markers).
pub const DEFAULT_RESERVED_KEYS: &[&str] = &["datastar"];

#[derive(Clone, Debug)]
pub struct QueryParser {
    reserved_keys: BTreeSet<String>,
}

impl Default for QueryParser {
    fn default() -> Self {
        QueryParser::with_reserved_keys(DEFAULT_RESERVED_KEYS.iter().copied())
    }
}

impl QueryParser {
    pub fn new() -> Self {
        QueryParser::default()
    }

    pub fn with_reserved_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryParser {
            reserved_keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved_keys.contains(key)
    }

    /// Builds criteria from an ordered multimap of request parameters.
    /// Filters are appended in iteration order.
    pub fn parse<I, K, V, S>(&self, params: I) -> Result<Criteria, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut criteria = Criteria::default();
        for (key, values) in params {
            let key = key.as_ref();
            if self.is_reserved(key) {
                tracing::trace!(key, "skipping reserved parameter");
                continue;
            }
            for value in values {
                parse_value(key, value.as_ref(), &mut criteria)?;
            }
        }
        Ok(criteria)
    }

    /// Decodes an `application/x-www-form-urlencoded` query string and parses it.
    /// Repeated keys are grouped under their first occurrence.
    pub fn parse_query_string(&self, query: &str) -> Result<Criteria, QueryError> {
        self.parse(group_pairs(url::form_urlencoded::parse(query.as_bytes())))
    }
}

fn group_pairs<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    for (k, v) in pairs {
        match index_by_key.get(k.as_ref()) {
            Some(&i) => grouped[i].1.push(v.into_owned()),
            None => {
                let key = k.into_owned();
                index_by_key.insert(key.clone(), grouped.len());
                grouped.push((key, vec![v.into_owned()]));
            }
        }
    }
    grouped
}

fn parse_value(key: &str, value: &str, criteria: &mut Criteria) -> Result<(), QueryError> {
    if value.is_empty() {
        return Ok(());
    }
    let parts: Vec<&str> = value.splitn(MAX_PARTS, ':').collect();
    match parts.as_slice() {
        [_] => {
            tracing::trace!(key, value, "ignoring value without operator");
            Ok(())
        }
        [name, raw] if *name == PARAMETER_PAGE || *name == PARAMETER_LIMIT => {
            parse_pagination(key, name, raw, &mut criteria.pagination)
        }
        [name, direction] if *name == PARAMETER_SORT => {
            criteria.sorts.push(Sort::new(key, Direction::parse(direction)));
            Ok(())
        }
        _ => {
            append_filter(criteria, parse_filter(key, &parts));
            Ok(())
        }
    }
}

fn parse_pagination(key: &str, name: &str, raw: &str, pagination: &mut Pagination) -> Result<(), QueryError> {
    let value: u32 = raw.parse().map_err(|source| QueryError::Parse {
        key: key.to_string(),
        value: raw.to_string(),
        source,
    })?;
    if name == PARAMETER_PAGE {
        pagination.page_number = value;
    } else {
        pagination.page_size = value;
    }
    Ok(())
}

fn parse_filter(key: &str, parts: &[&str]) -> Filter {
    let mut rest = parts;
    let mut override_key = None;
    // `x:<op>:<value>:<key>`: the trailing key also overrides the predecessor.
    if let [_, _, _, trailing] = *rest {
        override_key = ChainingKey::parse(trailing);
        rest = &rest[1..];
    }
    if let [leading, _, _] = *rest {
        if let Some(chaining) = ChainingKey::parse(leading) {
            override_key = Some(chaining);
            rest = &rest[1..];
        }
    }

    let op_token = rest.first().copied().unwrap_or_default();
    let raw_value = rest.get(1).copied().unwrap_or_default();
    let operator = Operator::from_token(op_token).unwrap_or_else(|| {
        tracing::trace!(key, token = op_token, "unknown operator, using eq");
        Operator::Equal
    });
    let chaining_key = rest
        .get(2)
        .and_then(|token| ChainingKey::parse(token))
        .unwrap_or(DEFAULT_CHAINING);

    let value = if operator.is_list() {
        Value::Array(raw_value.split(',').map(|v| Value::String(v.to_string())).collect())
    } else {
        Value::String(raw_value.to_string())
    };

    let (module, field) = match key.split_once('.') {
        Some((module, field)) if !field.contains('.') => (Some(module.to_string()), field),
        _ => (None, key),
    };

    Filter {
        module,
        field: field.to_string(),
        operator,
        value,
        chaining_key: Some(chaining_key),
        override_previous_chaining_key: override_key,
        ..Filter::default()
    }
}

fn append_filter(criteria: &mut Criteria, filter: Filter) {
    let target = match &filter.module {
        Some(module) => criteria.filters_by_module.entry(module.clone()).or_default(),
        None => &mut criteria.filters,
    };
    target.push_with_override(filter);
}
