//! Request-processing middleware, composed into an explicit chain at
//! router-build time.
//!
//! - [`auth::auth_gateway`] -- rejects unauthenticated requests outside the
//!   allow-list and attaches the caller's session data.
//! - [`auth::AuthUser`] -- extracts the attached session data in handlers.
//! - [`cache::cache_responses`] -- serves cached GET responses per user.

pub mod auth;
pub mod cache;
