//! Key-value cache used as the session store and the response cache.
//!
//! - [`store::Cache`] -- the store contract: `get` / `set_ex` / `del` / `ping`.
//! - [`store::RedisCache`] -- production backend over a multiplexed Redis connection.
//! - [`store::MemoryCache`] -- in-process backend for tests and local development.

pub mod error;
pub mod store;

pub use error::CacheError;
pub use store::{Cache, MemoryCache, RedisCache};
