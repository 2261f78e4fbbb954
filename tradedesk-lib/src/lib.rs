//! Tradedesk client library
//!
//! Table controllers and a REST client for a commodity trading console:
//! buyers, sellers, traders and purchase/sale contracts.
//!
//! - [`table`] - query state, filters, fetching and presentation for paginated tables
//! - [`api`] - list queries against the CRM and contract backends
//! - [`model`] - typed entities decoded from the backends
//! - [`auth`] - session credentials attached to every request

pub mod api;
pub mod auth;
pub mod error;
pub mod model;
pub mod rate_limit;
pub mod table;

mod client;

pub use client::*;
