use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chassis_api::auth::service::AuthService;
use chassis_api::auth::token::TokenService;
use chassis_api::config::ServerConfig;
use chassis_api::router::build_app_router;
use chassis_api::state::AppState;
use chassis_cache::{Cache, RedisCache};
use chassis_db::repositories::{CatStore, PgCatStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chassis_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Cache / session store ---
    let cache: Arc<dyn Cache> = Arc::new(
        RedisCache::connect(&config.redis_url)
            .await
            .expect("Failed to connect to Redis"),
    );
    tracing::info!("Cache connection established");

    // --- Database ---
    let pool = chassis_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    chassis_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    chassis_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let cats: Arc<dyn CatStore> = Arc::new(PgCatStore::new(pool.clone()));

    // --- App state ---
    let config = Arc::new(config);
    let auth_config = Arc::new(config.auth.clone());
    let tokens = TokenService::new(Arc::clone(&cache), auth_config);
    let auth =
        AuthService::new(&config.auth, tokens.clone()).expect("Failed to initialise auth service");

    let state = AppState {
        cats,
        cache,
        tokens,
        auth,
        config: Arc::clone(&config),
    };

    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    pool.close().await;
    tracing::info!("Database pool closed");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
