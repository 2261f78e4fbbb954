//! Query building blocks for list endpoints.
//!
//! - [`Filter`] - Filter conditions rendered to the `filter` parameter
//! - [`OrderBy`] - Ordering rendered to the `sort` parameter

mod filter;
mod order;

pub use filter::Filter;
pub use filter::escape_regex;
pub use order::OrderBy;
