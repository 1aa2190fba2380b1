//! criteria-sql: request-driven query criteria compiled to parameterized PostgreSQL.
//!
//! A query string such as `name=contains:adm&createdAt=gt:2024-01-01&x=limit:10`
//! is parsed into a [`Criteria`], translated through a per-table field whitelist
//! and compiled into SQL text with `$n` placeholders plus positional arguments.

pub mod case;
pub mod config;
pub mod criteria;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{load_from_path, load_from_str, resolve, QueryConfig, ResolvedModel, ResolvedTable};
pub use criteria::{Criteria, Filter, Filters, Operator, QueryParser};
pub use error::{AppError, ConfigError, QueryError};
pub use routes::{common_routes, table_routes};
pub use service::{Executor, PgExecutor, TableRepository};
pub use sql::{delete_from, insert_into, select, update, QueryBuf};
pub use state::AppState;
