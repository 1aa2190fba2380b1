//! Execution layer: the database capability and table repositories on top of it.

mod executor;
mod repository;
pub use executor::{Executor, PgExecutor};
pub use repository::TableRepository;
