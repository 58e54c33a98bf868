//! Search module.
//!
//! Provides ad filters, sorting, and limit/offset pagination.

mod filter;
mod query;
mod results;

pub use filter::AdFilter;
pub use query::{AdQuery, AdSort};
pub use results::{AdPage, Pagination, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
