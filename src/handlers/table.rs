//! Table handlers: list, count, first, create, bulk create, update and delete,
//! all scoped by criteria from the query string.

use crate::config::ResolvedTable;
use crate::error::AppError;
use crate::extractors::CriteriaQuery;
use crate::response::{success_many, success_one};
use crate::service::TableRepository;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Map, Value};

fn table<'a>(state: &'a AppState, name: &str) -> Result<&'a ResolvedTable, AppError> {
    state
        .model
        .table(name)
        .ok_or_else(|| AppError::NotFound(format!("table {}", name)))
}

fn repository<'a>(state: &'a AppState, table: &'a ResolvedTable) -> TableRepository<'a> {
    TableRepository::new(state.executor.as_ref(), table).with_max_page_size(state.model.max_page_size)
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(name): Path<String>,
    CriteriaQuery(criteria): CriteriaQuery,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &name)?;
    let rows = repository(&state, table).list(criteria).await?;
    Ok(success_many(StatusCode::OK, rows))
}

pub async fn count(
    State(state): State<AppState>,
    Path(name): Path<String>,
    CriteriaQuery(criteria): CriteriaQuery,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &name)?;
    let total = repository(&state, table).count(criteria).await?;
    Ok(success_one(StatusCode::OK, json!({ "count": total })))
}

pub async fn first(
    State(state): State<AppState>,
    Path(name): Path<String>,
    CriteriaQuery(criteria): CriteriaQuery,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &name)?;
    let row = repository(&state, table)
        .find(criteria)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no {} row matches", name)))?;
    Ok(success_one(StatusCode::OK, row))
}

pub async fn create(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &name)?;
    let row = repository(&state, table)
        .create(body_to_map(body)?)
        .await?
        .unwrap_or(Value::Null);
    Ok(success_one(StatusCode::CREATED, row))
}

pub async fn bulk_create(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &name)?;
    let Value::Array(items) = body else {
        return Err(AppError::BadRequest("body must be a JSON array of objects".into()));
    };
    let rows = items.into_iter().map(body_to_map).collect::<Result<Vec<_>, _>>()?;
    let created = repository(&state, table).create_bulk(rows).await?;
    Ok(success_many(StatusCode::CREATED, created))
}

/// PATCH: body fields are written to every row matching the query-string filters.
pub async fn update(
    State(state): State<AppState>,
    Path(name): Path<String>,
    CriteriaQuery(criteria): CriteriaQuery,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &name)?;
    let rows = repository(&state, table)
        .update(body_to_map(body)?, criteria.filters)
        .await?;
    Ok(success_many(StatusCode::OK, rows))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
    CriteriaQuery(criteria): CriteriaQuery,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &name)?;
    let deleted = repository(&state, table).delete(criteria.filters).await?;
    Ok(success_one(StatusCode::OK, json!({ "deleted": deleted })))
}
