//! REST operations against the CRM and contract backends.

mod list;
pub mod query;
mod request;
mod source;

pub use list::*;
pub use request::PARTITION_KEY_HEADER;
pub use source::*;
