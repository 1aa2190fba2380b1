//! Convert serde_json::Value arguments to types that sqlx can bind.

use crate::config::ColumnKind;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value that can be bound to a PostgreSQL query. Converts from serde_json::Value.
///
/// Strings bind as `text` unless [`PgBindValue::typed`] is given a `uuid` or
/// `timestamp` column kind.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Uuid(uuid::Uuid),
    Timestamptz(DateTime<FixedOffset>),
    Json(Value),
}

impl From<&Value> for PgBindValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PgBindValue::I64(i),
                None => PgBindValue::F64(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => PgBindValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => PgBindValue::Json(v.clone()),
        }
    }
}

impl PgBindValue {
    /// Converts `v` for a column of `kind`. Without a kind, falls back to the
    /// JSON shape.
    pub fn typed(v: &Value, kind: Option<ColumnKind>) -> Self {
        match (kind, v) {
            (_, Value::Null) => PgBindValue::Null,
            (Some(ColumnKind::Uuid), Value::String(s)) => match uuid::Uuid::parse_str(s) {
                Ok(u) => PgBindValue::Uuid(u),
                Err(_) => PgBindValue::String(s.clone()),
            },
            (Some(ColumnKind::Timestamp), Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
                Ok(ts) => PgBindValue::Timestamptz(ts),
                Err(_) => PgBindValue::String(s.clone()),
            },
            (Some(ColumnKind::Float), Value::Number(n)) => PgBindValue::F64(n.as_f64().unwrap_or_default()),
            (Some(ColumnKind::Json), _) => PgBindValue::Json(v.clone()),
            _ => PgBindValue::from(v),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => IsNull::Yes,
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::String(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBindValue::Uuid(u) => <uuid::Uuid as Encode<Postgres>>::encode_by_ref(u, buf)?,
            PgBindValue::Timestamptz(ts) => {
                <DateTime<FixedOffset> as Encode<Postgres>>::encode_by_ref(ts, buf)?
            }
            PgBindValue::Json(v) => <serde_json::Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            // Oid 0 leaves the parameter type to the server.
            PgBindValue::Null => PgTypeInfo::with_oid(Oid(0)),
            PgBindValue::Bool(_) => PgTypeInfo::with_name("BOOL"),
            PgBindValue::I64(_) => PgTypeInfo::with_name("INT8"),
            PgBindValue::F64(_) => PgTypeInfo::with_name("FLOAT8"),
            PgBindValue::String(_) => PgTypeInfo::with_name("TEXT"),
            PgBindValue::Uuid(_) => PgTypeInfo::with_name("UUID"),
            PgBindValue::Timestamptz(_) => PgTypeInfo::with_name("TIMESTAMPTZ"),
            PgBindValue::Json(_) => PgTypeInfo::with_name("JSONB"),
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::TypeInfo;

    #[test]
    fn scalars() {
        assert_eq!(PgBindValue::from(&json!(null)), PgBindValue::Null);
        assert_eq!(PgBindValue::from(&json!(true)), PgBindValue::Bool(true));
        assert_eq!(PgBindValue::from(&json!(-3)), PgBindValue::I64(-3));
        assert_eq!(PgBindValue::from(&json!(1.5)), PgBindValue::F64(1.5));
        assert_eq!(PgBindValue::from(&json!("admin")), PgBindValue::String("admin".into()));
    }

    #[test]
    fn strings_bind_as_text_without_a_kind() {
        let id = json!("6f1c2a1e-1d0c-4a8e-9d6e-2f6f1c2a1e00");
        assert!(matches!(PgBindValue::from(&id), PgBindValue::String(_)));
        assert!(matches!(PgBindValue::from(&json!("2024-01-01T00:00:00Z")), PgBindValue::String(_)));
    }

    #[test]
    fn text_column_keeps_uuid_and_timestamp_shaped_strings_as_text() {
        for raw in ["6f1c2a1e-1d0c-4a8e-9d6e-2f6f1c2a1e00", "2024-01-01T00:00:00Z"] {
            let bind = PgBindValue::typed(&json!(raw), Some(ColumnKind::Text));
            assert_eq!(bind, PgBindValue::String(raw.into()));
            assert_eq!(bind.produces().as_ref().map(TypeInfo::name), Some("TEXT"));
        }
    }

    #[test]
    fn kind_selects_bind_type() {
        let id = json!("6f1c2a1e-1d0c-4a8e-9d6e-2f6f1c2a1e00");
        let bind = PgBindValue::typed(&id, Some(ColumnKind::Uuid));
        assert!(matches!(bind, PgBindValue::Uuid(_)));
        assert_eq!(bind.produces().as_ref().map(TypeInfo::name), Some("UUID"));

        let ts = PgBindValue::typed(&json!("2024-01-01T00:00:00Z"), Some(ColumnKind::Timestamp));
        assert!(matches!(ts, PgBindValue::Timestamptz(_)));

        assert_eq!(PgBindValue::typed(&json!(2), Some(ColumnKind::Float)), PgBindValue::F64(2.0));
        assert_eq!(PgBindValue::typed(&json!("x"), Some(ColumnKind::Json)), PgBindValue::Json(json!("x")));
        assert_eq!(PgBindValue::typed(&Value::Null, Some(ColumnKind::Uuid)), PgBindValue::Null);
    }

    #[test]
    fn containers_bind_as_json() {
        assert!(matches!(PgBindValue::from(&json!({"a": 1})), PgBindValue::Json(_)));
        assert!(matches!(PgBindValue::from(&json!([1, 2])), PgBindValue::Json(_)));
    }
}
