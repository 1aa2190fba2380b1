//! Repository behavior against an in-memory executor that records statements.

use async_trait::async_trait;
use criteria_sql::config::ColumnKind;
use criteria_sql::criteria::{Filters, Operator, QueryParser};
use criteria_sql::sql::PgBindValue;
use criteria_sql::{load_from_str, resolve, AppError, Criteria, Executor, QueryBuf, ResolvedModel, TableRepository};
use serde_json::{json, Map, Value};
use std::sync::Mutex;

#[derive(Default)]
struct RecordingExecutor {
    statements: Mutex<Vec<QueryBuf>>,
    rows: Vec<Value>,
}

impl RecordingExecutor {
    fn returning(rows: Vec<Value>) -> Self {
        RecordingExecutor {
            statements: Mutex::new(Vec::new()),
            rows,
        }
    }

    fn last(&self) -> QueryBuf {
        self.statements.lock().unwrap().last().cloned().unwrap()
    }

    fn record(&self, q: &QueryBuf) {
        self.statements.lock().unwrap().push(q.clone());
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        self.record(q);
        Ok(self.rows.clone())
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        self.record(q);
        Ok(self.rows.first().cloned())
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        self.record(q);
        Ok(self.rows.len() as u64)
    }
}

fn model() -> ResolvedModel {
    let cfg = load_from_str(
        r#"{
            "max_page_size": 50,
            "tables": [{
                "name": "roles",
                "schema": "auth",
                "columns": [
                    {"name": "id", "kind": "int"},
                    {"name": "code"},
                    {"name": "is_system", "kind": "bool"},
                    {"name": "created_at", "kind": "timestamp"}
                ]
            }]
        }"#,
    )
    .unwrap();
    resolve(&cfg).unwrap()
}

fn object(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => panic!("not an object"),
    }
}

#[tokio::test]
async fn list_coerces_clamps_and_renames() {
    let model = model();
    let exec = RecordingExecutor::returning(vec![json!({"id": 1, "code": "admin", "is_system": true})]);
    let repo = TableRepository::new(&exec, model.table("roles").unwrap()).with_max_page_size(model.max_page_size);

    let criteria = Criteria::filter_by("isSystem", Operator::Equal, "true")
        .and("id", Operator::In, json!(["1", "2"]))
        .limit(500);
    let rows = repo.list(criteria).await.unwrap();

    let q = exec.last();
    assert_eq!(
        q.sql,
        "SELECT id, code, is_system, created_at FROM auth.roles WHERE is_system = $1 AND id IN ($2, $3) LIMIT 50 OFFSET 0"
    );
    assert_eq!(q.args, vec![json!(true), json!(1), json!(2)]);
    assert_eq!(rows, vec![json!({"id": 1, "code": "admin", "isSystem": true})]);
}

#[tokio::test]
async fn list_rejects_values_that_do_not_fit_the_column() {
    let model = model();
    let exec = RecordingExecutor::default();
    let repo = TableRepository::new(&exec, model.table("roles").unwrap());
    let err = repo.list(Criteria::filter_by("id", Operator::Equal, "abc")).await.unwrap_err();
    assert!(matches!(err, AppError::Query(_)));
    assert!(exec.statements.lock().unwrap().is_empty());
}

#[tokio::test]
async fn text_column_binds_uuid_shaped_value_as_text() {
    let model = model();
    let exec = RecordingExecutor::default();
    let repo = TableRepository::new(&exec, model.table("roles").unwrap());

    let id = "6f1c2a1e-1d0c-4a8e-9d6e-2f6f1c2a1e00";
    let criteria = QueryParser::new()
        .parse_query_string(&format!("code=eq:{id}"))
        .unwrap()
        .and("createdAt", Operator::GreaterOrEqual, "2024-01-01");
    repo.list(criteria).await.unwrap();

    let q = exec.last();
    assert_eq!(q.kinds, vec![Some(ColumnKind::Text), Some(ColumnKind::Timestamp)]);
    assert_eq!(PgBindValue::typed(&q.args[0], q.kind_at(0)), PgBindValue::String(id.into()));
    assert!(matches!(PgBindValue::typed(&q.args[1], q.kind_at(1)), PgBindValue::Timestamptz(_)));
}

#[tokio::test]
async fn find_count_and_exists() {
    let model = model();
    let exec = RecordingExecutor::returning(vec![json!({"total": 3})]);
    let repo = TableRepository::new(&exec, model.table("roles").unwrap());

    let criteria = Criteria::filter_by("code", Operator::Equal, "admin").sort_by("code", Default::default());
    assert_eq!(repo.count(criteria.clone()).await.unwrap(), 3);
    assert_eq!(exec.last().sql, "SELECT COUNT(*) AS total FROM auth.roles WHERE code = $1");

    assert!(repo.exists(criteria.clone()).await.unwrap());
    assert_eq!(exec.last().sql, "SELECT 1 FROM auth.roles WHERE code = $1 LIMIT 1 OFFSET 0");

    repo.find(criteria).await.unwrap();
    assert_eq!(
        exec.last().sql,
        "SELECT id, code, is_system, created_at FROM auth.roles WHERE code = $1 ORDER BY code LIMIT 1 OFFSET 0"
    );
}

#[tokio::test]
async fn create_maps_fields_to_columns() {
    let model = model();
    let exec = RecordingExecutor::returning(vec![json!({"id": 9, "code": "ops", "is_system": false})]);
    let repo = TableRepository::new(&exec, model.table("roles").unwrap());

    let row = repo
        .create(object(json!({"code": "ops", "isSystem": "false"})))
        .await
        .unwrap()
        .unwrap();
    let q = exec.last();
    assert_eq!(
        q.sql,
        "INSERT INTO auth.roles (code, is_system) VALUES ($1, $2) RETURNING id, code, is_system, created_at"
    );
    assert_eq!(q.args, vec![json!("ops"), json!(false)]);
    assert_eq!(row["isSystem"], json!(false));

    let err = repo.create(object(json!({"password": "x"}))).await.unwrap_err();
    assert!(matches!(err, AppError::Query(_)));
}

#[tokio::test]
async fn create_bulk_requires_matching_fields() {
    let model = model();
    let exec = RecordingExecutor::default();
    let repo = TableRepository::new(&exec, model.table("roles").unwrap());

    repo.create_bulk(vec![object(json!({"code": "a"})), object(json!({"code": "b"}))])
        .await
        .unwrap();
    assert_eq!(
        exec.last().sql,
        "INSERT INTO auth.roles (code) VALUES ($1), ($2) RETURNING id, code, is_system, created_at"
    );

    let err = repo
        .create_bulk(vec![object(json!({"code": "a"})), object(json!({"code": "b", "id": 2}))])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Query(_)));
    assert!(repo.create_bulk(Vec::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_is_partial_and_requires_filters() {
    let model = model();
    let exec = RecordingExecutor::default();
    let repo = TableRepository::new(&exec, model.table("roles").unwrap());

    repo.update(
        object(json!({"code": "root", "createdAt": null})),
        Filters::by("id", Operator::Equal, "7"),
    )
    .await
    .unwrap();
    let q = exec.last();
    assert_eq!(
        q.sql,
        "UPDATE auth.roles SET code = $1, created_at = $2 WHERE id = $3 RETURNING id, code, is_system, created_at"
    );
    assert_eq!(q.args, vec![json!("root"), Value::Null, json!(7)]);

    let err = repo.update(object(json!({"code": "x"})), Filters::new()).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn delete_returns_rows_affected() {
    let model = model();
    let exec = RecordingExecutor::returning(vec![json!({}), json!({})]);
    let repo = TableRepository::new(&exec, model.table("roles").unwrap());

    let deleted = repo.delete(Filters::by("createdAt", Operator::Less, "2020-01-01")).await.unwrap();
    assert_eq!(deleted, 2);
    let q = exec.last();
    assert_eq!(q.sql, "DELETE FROM auth.roles WHERE created_at < $1");
    assert_eq!(q.args, vec![json!("2020-01-01T00:00:00Z")]);

    assert!(matches!(repo.delete(Filters::new()).await, Err(AppError::BadRequest(_))));
}
