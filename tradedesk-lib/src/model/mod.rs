//! Typed entities served by the CRM and contract backends.
//!
//! Rows are decoded once at the HTTP boundary into these types; the table
//! layer works on their serialized form through column accessors.

mod contract;
mod entity;
mod party;

pub use contract::*;
pub use entity::*;
pub use party::*;
