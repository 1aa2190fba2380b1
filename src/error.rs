//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::num::ParseIntError;
use thiserror::Error;

/// Input-validation failures raised while parsing or compiling a query.
/// All of them are client errors; none is retryable.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid field name for {context}: {field}")]
    InvalidFieldName { field: String, context: &'static str },
    #[error("invalid operator: {0}")]
    InvalidOperator(String),
    #[error("empty columns")]
    EmptyColumns,
    #[error("column count mismatch: expected {expected} values, got {got}")]
    ColumnCountMismatch { expected: usize, got: usize },
    #[error("invalid integer for '{key}': {value}")]
    Parse {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid {kind} value for '{field}': {value}")]
    InvalidValue {
        field: String,
        kind: &'static str,
        value: String,
    },
}

impl QueryError {
    pub(crate) fn invalid_field(field: impl Into<String>, context: &'static str) -> Self {
        QueryError::InvalidFieldName {
            field: field.into(),
            context,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
    #[error("duplicate field: {field}")]
    DuplicateField { field: String },
    #[error("column '{column}' is mapped by both '{first}' and '{second}'")]
    DuplicateColumn { column: String, first: String, second: String },
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Query(_) | AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_are_bad_requests() {
        let err = AppError::from(QueryError::invalid_field("password", "filter"));
        assert_eq!(err.status_code(), (StatusCode::BAD_REQUEST, "bad_request"));
        assert_eq!(err.to_string(), "invalid field name for filter: password");
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err = AppError::Db(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn config_errors_are_server_errors() {
        let err = AppError::from(ConfigError::DuplicateTable("auth.roles".into()));
        assert_eq!(err.status_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
