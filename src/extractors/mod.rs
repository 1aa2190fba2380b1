//! Request extractors.

mod criteria;
pub use criteria::CriteriaQuery;
