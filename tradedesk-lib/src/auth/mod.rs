//! Session capability
//!
//! Requests against the CRM and contract backends need a bearer token and the
//! partition key of the organization the user is working in. Both live in an
//! ambient session store owned by the embedding application; this crate only
//! ever reads them through [`SessionProvider`].

mod session;

pub use session::SessionProvider;
pub use session::StaticSession;
