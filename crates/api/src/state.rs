use std::sync::Arc;

use chassis_cache::Cache;
use chassis_db::repositories::CatStore;

use crate::auth::service::AuthService;
use crate::auth::token::TokenService;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Every dependency is injected at construction; there are no module-level
/// singletons. The stores are trait objects so tests swap in in-memory
/// backends. Cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Cats document store.
    pub cats: Arc<dyn CatStore>,
    /// Key-value store backing sessions and the response cache.
    pub cache: Arc<dyn Cache>,
    /// Token mint/verify/refresh/revoke service.
    pub tokens: TokenService,
    /// Login/refresh/logout flows for the configured user.
    pub auth: AuthService,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
