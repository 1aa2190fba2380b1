//! Request criteria model: filters, sorts, pagination, projection, and the
//! query-string parser that builds them from request parameters.

mod aggregate;
pub mod filter;
pub mod pagination;
pub mod parse;
pub mod sort;

pub use aggregate::Criteria;
pub use filter::*;
pub use pagination::*;
pub use parse::*;
pub use sort::*;
