//! Safe SQL builder: identifiers from code or a field whitelist, values as parameters.

pub mod clauses;
pub mod columns;
pub mod delete;
pub mod insert;
pub mod params;
mod query_buf;
pub mod select;
pub mod update;
pub mod where_clause;

pub use clauses::*;
pub use columns::*;
pub use delete::*;
pub use insert::*;
pub use params::*;
pub use query_buf::QueryBuf;
pub use select::*;
pub use update::*;
pub use where_clause::*;
