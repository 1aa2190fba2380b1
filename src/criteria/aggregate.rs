//! Everything one request asks of a table.

use crate::criteria::{Direction, Filters, Operator, Pagination, Sort};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Filters, sorts, pagination and projection for one request.
///
/// Every method takes the criteria by value and returns the updated one, so a
/// value is never mutated behind another holder's back. Derive several queries
/// from a common base with `base.clone().and(..)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    pub select_columns: Vec<String>,
    pub filters: Filters,
    /// Filters addressed as `module.field`. Parsed but not compiled.
    pub filters_by_module: BTreeMap<String, Filters>,
    pub sorts: Vec<Sort>,
    pub pagination: Pagination,
}

impl Criteria {
    pub fn new() -> Self {
        Criteria::default()
    }

    /// Criteria holding a single filter.
    pub fn where_(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Criteria {
            filters: Filters::by(field, operator, value),
            ..Criteria::default()
        }
    }

    /// Same as [`Criteria::where_`].
    pub fn filter_by(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Criteria::where_(field, operator, value)
    }

    pub fn and(mut self, field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.filters = self.filters.and(field, operator, value);
        self
    }

    pub fn or(mut self, field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.filters = self.filters.or(field, operator, value);
        self
    }

    pub fn and_group(mut self, group: impl Into<Filters>) -> Self {
        self.filters = self.filters.and_group(group);
        self
    }

    pub fn or_group(mut self, group: impl Into<Filters>) -> Self {
        self.filters = self.filters.or_group(group);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sorts.push(Sort::new(field, direction));
        self
    }

    pub fn limit(mut self, page_size: u32) -> Self {
        self.pagination.page_size = page_size;
        self
    }

    pub fn page(mut self, page_number: u32) -> Self {
        self.pagination.page_number = page_number;
        self
    }

    /// Replaces the projection with `columns` (domain field names).
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}
