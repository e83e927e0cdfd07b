//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`token`] -- signed tokens backed by server-side session records.
//! - [`service`] -- login/refresh/logout against the configured user.

pub mod password;
pub mod service;
pub mod token;
