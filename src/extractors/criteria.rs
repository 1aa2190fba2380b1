//! Extract request criteria from the URL query string.

use crate::criteria::Criteria;
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Criteria parsed from the raw query string with the state's parser.
/// Rejects with 400 when a page or limit is not an integer.
#[derive(Clone, Debug, Default)]
pub struct CriteriaQuery(pub Criteria);

#[async_trait]
impl FromRequestParts<AppState> for CriteriaQuery {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let criteria = state.parser.parse_query_string(query)?;
        tracing::trace!(query, filters = criteria.filters.len(), "criteria parsed");
        Ok(CriteriaQuery(criteria))
    }
}
