//! Runs compiled statements against PostgreSQL.

use crate::error::AppError;
use crate::sql::{PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row, TypeInfo};

/// Database capability the repository runs statements through.
/// Rows come back as JSON objects keyed by SQL column name.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError>;
    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Value>, AppError>;
    /// Rows affected.
    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        PgExecutor { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind_all(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    tracing::debug!(sql = %q.sql, args = ?q.args, "query");
    q.args
        .iter()
        .enumerate()
        .fold(sqlx::query(&q.sql), |query, (i, arg)| {
            query.bind(PgBindValue::typed(arg, q.kind_at(i)))
        })
}

#[async_trait]
impl Executor for PgExecutor {
    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        let rows = bind_all(q).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        let row = bind_all(q).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(row_to_json))
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        let done = bind_all(q).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }
}

fn row_to_json(row: &PgRow) -> Value {
    let mut map = Map::new();
    for col in row.columns() {
        let value = cell_to_value(row, col.ordinal(), col.type_info().name());
        map.insert(col.name().to_string(), value);
    }
    Value::Object(map)
}

/// Decodes one cell by its PostgreSQL type name. Unknown types are tried as text.
fn cell_to_value(row: &PgRow, idx: usize, type_name: &str) -> Value {
    fn get<'r, T>(row: &'r PgRow, idx: usize) -> Option<T>
    where
        T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    {
        row.try_get::<Option<T>, _>(idx).ok().flatten()
    }

    let value = match type_name {
        "INT2" => get::<i16>(row, idx).map(Value::from),
        "INT4" => get::<i32>(row, idx).map(Value::from),
        "INT8" => get::<i64>(row, idx).map(Value::from),
        "FLOAT4" => get::<f32>(row, idx).and_then(|n| Number::from_f64(f64::from(n))).map(Value::Number),
        "FLOAT8" => get::<f64>(row, idx).and_then(Number::from_f64).map(Value::Number),
        "BOOL" => get::<bool>(row, idx).map(Value::Bool),
        "UUID" => get::<uuid::Uuid>(row, idx).map(|u| Value::String(u.to_string())),
        "TIMESTAMPTZ" => get::<chrono::DateTime<chrono::Utc>>(row, idx).map(|d| Value::String(d.to_rfc3339())),
        "TIMESTAMP" => get::<chrono::NaiveDateTime>(row, idx)
            .map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "DATE" => get::<chrono::NaiveDate>(row, idx).map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        "JSON" | "JSONB" => get::<Value>(row, idx),
        _ => get::<String>(row, idx).map(Value::String),
    };
    value.unwrap_or(Value::Null)
}
