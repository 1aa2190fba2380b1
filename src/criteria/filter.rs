//! Filter predicates and the chaining rules that join them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Deref;

/// Comparison operators understood by the compiler. The set is closed: parsing
/// an unknown token falls back to [`Operator::Equal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "eq")]
    Equal,
    #[serde(rename = "ne")]
    NotEqual,
    #[serde(rename = "gt")]
    Greater,
    #[serde(rename = "gte")]
    GreaterOrEqual,
    #[serde(rename = "lt")]
    Less,
    #[serde(rename = "lte")]
    LessOrEqual,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "nin")]
    NotIn,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "ncontains")]
    NotContains,
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "isnull")]
    IsNull,
    #[serde(rename = "isn")]
    IsNot,
    #[serde(rename = "isnnull")]
    IsNotNull,
    /// Value already carries its own comparison; rendered as equality.
    #[serde(rename = "default")]
    Default,
}

impl Operator {
    pub const ALL: [Operator; 16] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::Greater,
        Operator::GreaterOrEqual,
        Operator::Less,
        Operator::LessOrEqual,
        Operator::Like,
        Operator::In,
        Operator::NotIn,
        Operator::Contains,
        Operator::NotContains,
        Operator::Is,
        Operator::IsNull,
        Operator::IsNot,
        Operator::IsNotNull,
        Operator::Default,
    ];

    /// Wire token used in query strings (e.g. `gte`).
    pub fn token(self) -> &'static str {
        match self {
            Operator::Equal => "eq",
            Operator::NotEqual => "ne",
            Operator::Greater => "gt",
            Operator::GreaterOrEqual => "gte",
            Operator::Less => "lt",
            Operator::LessOrEqual => "lte",
            Operator::Like => "like",
            Operator::In => "in",
            Operator::NotIn => "nin",
            Operator::Contains => "contains",
            Operator::NotContains => "ncontains",
            Operator::Is => "is",
            Operator::IsNull => "isnull",
            Operator::IsNot => "isn",
            Operator::IsNotNull => "isnnull",
            Operator::Default => "default",
        }
    }

    /// Exact (case-sensitive) token lookup.
    pub fn from_token(token: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.token() == token)
    }

    /// Whether the value is a list expanded into one placeholder per element.
    pub fn is_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl Default for Operator {
    fn default() -> Self {
        Operator::Equal
    }
}

/// Boolean connective placed between a filter and the one after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChainingKey {
    And,
    Or,
}

impl ChainingKey {
    pub fn as_sql(self) -> &'static str {
        match self {
            ChainingKey::And => "AND",
            ChainingKey::Or => "OR",
        }
    }

    /// Case-insensitive: `and`, `AND`, `Or` ...
    pub fn parse(token: &str) -> Option<ChainingKey> {
        if token.eq_ignore_ascii_case("and") {
            Some(ChainingKey::And)
        } else if token.eq_ignore_ascii_case("or") {
            Some(ChainingKey::Or)
        } else {
            None
        }
    }
}

/// A single predicate. `chaining_key` joins this filter to the *next* one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Namespace for joined resources (`module.field` in query strings).
    pub module: Option<String>,
    pub field: String,
    pub operator: Operator,
    pub value: Value,
    pub chaining_key: Option<ChainingKey>,
    pub is_group_open: bool,
    pub group_open_qty: usize,
    pub is_group_close: bool,
    pub group_close_qty: usize,
    pub override_previous_chaining_key: Option<ChainingKey>,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Filter {
            field: field.into(),
            operator,
            value: value.into(),
            ..Filter::default()
        }
    }

    pub fn with_chaining_key(mut self, key: ChainingKey) -> Self {
        self.chaining_key = Some(key);
        self
    }

    /// Opens one more group before this predicate.
    pub fn open_group(mut self) -> Self {
        self.mark_group_open();
        self
    }

    /// Closes one more group after this predicate.
    pub fn close_group(mut self) -> Self {
        self.mark_group_close();
        self
    }

    fn mark_group_open(&mut self) {
        self.group_open_qty = if self.is_group_open {
            self.group_open_qty.max(1) + 1
        } else {
            1
        };
        self.is_group_open = true;
    }

    fn mark_group_close(&mut self) {
        self.group_close_qty = if self.is_group_close {
            self.group_close_qty.max(1) + 1
        } else {
            1
        };
        self.is_group_close = true;
    }
}

/// Ordered filter sequence. Builder methods consume `self` and return the
/// extended sequence; clone first to derive several queries from one base.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(Vec<Filter>);

impl Filters {
    pub fn new() -> Self {
        Filters(Vec::new())
    }

    /// Singleton sequence without a chaining key.
    pub fn by(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Filters(vec![Filter::new(field, operator, value)])
    }

    pub fn and(self, field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.chain(ChainingKey::And, Filter::new(field, operator, value))
    }

    pub fn or(self, field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.chain(ChainingKey::Or, Filter::new(field, operator, value))
    }

    /// Appends `group` wrapped in parentheses, joined to the current last filter with AND.
    pub fn and_group(self, group: impl Into<Filters>) -> Self {
        self.chain_group(ChainingKey::And, group.into())
    }

    /// Appends `group` wrapped in parentheses, joined to the current last filter with OR.
    pub fn or_group(self, group: impl Into<Filters>) -> Self {
        self.chain_group(ChainingKey::Or, group.into())
    }

    pub fn as_slice(&self) -> &[Filter] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Filter> {
        self.0
    }

    /// Appends `filter`; when it carries an override and has a predecessor,
    /// the predecessor's chaining key is rewritten and the marker cleared.
    pub(crate) fn push_with_override(&mut self, filter: Filter) {
        self.0.push(filter);
        if let Some((last, rest)) = self.0.split_last_mut() {
            if let (Some(prev), Some(key)) = (rest.last_mut(), last.override_previous_chaining_key) {
                prev.chaining_key = Some(key);
                last.override_previous_chaining_key = None;
            }
        }
    }

    /// The key lives on the predecessor: the last filter learns how it joins the new one.
    fn chain(mut self, key: ChainingKey, filter: Filter) -> Self {
        if let Some(last) = self.0.last_mut() {
            last.chaining_key = Some(key);
        }
        self.0.push(filter);
        self
    }

    fn chain_group(mut self, key: ChainingKey, group: Filters) -> Self {
        let mut group = group.0;
        if group.is_empty() {
            return self;
        }
        if let Some(last) = self.0.last_mut() {
            last.chaining_key = Some(key);
        }
        if let Some(first) = group.first_mut() {
            first.mark_group_open();
        }
        if let Some(last) = group.last_mut() {
            last.mark_group_close();
        }
        self.0.extend(group);
        self
    }
}

impl Deref for Filters {
    type Target = [Filter];

    fn deref(&self) -> &[Filter] {
        &self.0
    }
}

impl From<Vec<Filter>> for Filters {
    fn from(filters: Vec<Filter>) -> Self {
        Filters(filters)
    }
}

impl From<Filter> for Filters {
    fn from(filter: Filter) -> Self {
        Filters(vec![filter])
    }
}

impl FromIterator<Filter> for Filters {
    fn from_iter<T: IntoIterator<Item = Filter>>(iter: T) -> Self {
        Filters(iter.into_iter().collect())
    }
}

impl IntoIterator for Filters {
    type Item = Filter;
    type IntoIter = std::vec::IntoIter<Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Filters {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_filter_has_no_chaining_key() {
        let f = Filters::new().and("name", Operator::Equal, "john");
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].chaining_key, None);
    }

    #[test]
    fn chaining_key_is_set_on_predecessor() {
        let f = Filters::by("name", Operator::Equal, "john")
            .or("age", Operator::Greater, 18)
            .and("status", Operator::Equal, "active");
        assert_eq!(f[0].chaining_key, Some(ChainingKey::Or));
        assert_eq!(f[1].chaining_key, Some(ChainingKey::And));
        assert_eq!(f[2].chaining_key, None);
    }

    #[test]
    fn group_marks_first_and_last() {
        let group = Filters::by("a", Operator::Equal, 1).or("b", Operator::Equal, 2);
        let f = Filters::by("x", Operator::Equal, 0).and_group(group);
        assert_eq!(f[0].chaining_key, Some(ChainingKey::And));
        assert!(f[1].is_group_open);
        assert!(!f[1].is_group_close);
        assert!(f[2].is_group_close);
        assert!(!f[2].is_group_open);
    }

    #[test]
    fn single_filter_group_opens_and_closes_on_same_filter() {
        let f = Filters::new().or_group(Filter::new("a", Operator::IsNull, json!(null)));
        assert_eq!(f.len(), 1);
        assert!(f[0].is_group_open && f[0].is_group_close);
        assert_eq!(f[0].chaining_key, None);
    }

    #[test]
    fn nested_groups_accumulate_quantities() {
        let inner = Filters::by("b", Operator::Equal, 2).or("c", Operator::Equal, 3);
        let outer = Filters::by("a", Operator::Equal, 1).or_group(inner);
        let f = Filters::new().and_group(outer);
        assert_eq!(f[0].group_open_qty, 1);
        assert_eq!(f[1].group_open_qty, 1);
        assert_eq!(f[2].group_close_qty, 2);
    }

    #[test]
    fn empty_group_is_noop() {
        let f = Filters::by("a", Operator::Equal, 1).and_group(Filters::new());
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].chaining_key, None);
    }

    #[test]
    fn cloned_base_derivations_are_independent() {
        let base = Filters::by("a", Operator::Equal, 1);
        let left = base.clone().and("b", Operator::Equal, 2);
        let right = base.clone().or("c", Operator::Equal, 3);
        assert_eq!(base[0].chaining_key, None);
        assert_eq!(left[0].chaining_key, Some(ChainingKey::And));
        assert_eq!(right[0].chaining_key, Some(ChainingKey::Or));
        assert_eq!(right[1].field, "c");
    }

    #[test]
    fn operator_tokens_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_token(op.token()), Some(op));
        }
        assert_eq!(Operator::from_token("bogus"), None);
        assert_eq!(Operator::from_token("EQ"), None);
    }

    #[test]
    fn chaining_key_parse_is_case_insensitive() {
        assert_eq!(ChainingKey::parse("Or"), Some(ChainingKey::Or));
        assert_eq!(ChainingKey::parse("AND"), Some(ChainingKey::And));
        assert_eq!(ChainingKey::parse("xor"), None);
    }
}
