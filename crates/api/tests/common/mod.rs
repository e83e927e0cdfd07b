//! Shared test harness: builds the full application router against
//! in-memory backends, mirroring the construction in `main.rs` so tests
//! exercise the production middleware chain (CORS, request ID, timeout,
//! tracing, panic recovery, auth gateway, response cache).

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use chassis_api::auth::service::AuthService;
use chassis_api::auth::token::TokenService;
use chassis_api::config::{AppEnv, AuthConfig, ServerConfig, TokenTransport};
use chassis_api::router::build_app_router;
use chassis_api::state::AppState;
use chassis_cache::{Cache, MemoryCache};
use chassis_db::repositories::{CatStore, MemoryCatStore};

/// Password of the configured test user.
pub const TEST_PASSWORD: &str = "test-password-123";

/// Build a test `ServerConfig` with safe defaults and the given transport.
pub fn test_config(transport: TokenTransport) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        env: AppEnv::Test,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        database_url: "postgres://localhost/unused".to_string(),
        auth: AuthConfig {
            jwt_secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            jwt_issuer: "chassis".to_string(),
            jwt_audience: "chassis-clients".to_string(),
            uuid_namespace: Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 86400,
            username: "test".to_string(),
            password: TEST_PASSWORD.to_string(),
            unprotected_routes: vec![
                "/health".to_string(),
                "/auth/login".to_string(),
                "/auth/refresh".to_string(),
            ],
            token_transport: transport,
        },
    }
}

/// Build the full application router over in-memory backends.
///
/// Returns the state alongside the router so tests can reach behind the
/// HTTP surface (e.g. verify a token after logout, inspect the cache).
pub fn build_test_app(transport: TokenTransport) -> (Router, AppState) {
    let config = Arc::new(test_config(transport));
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    let cats: Arc<dyn CatStore> = Arc::new(MemoryCatStore::new());

    let tokens = TokenService::new(Arc::clone(&cache), Arc::new(config.auth.clone()));
    let auth = AuthService::new(&config.auth, tokens.clone())
        .expect("auth service construction should succeed");

    let state = AppState {
        cats,
        cache,
        tokens,
        auth,
        config: Arc::clone(&config),
    };

    (build_app_router(state.clone()), state)
}

/// Send a request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("request should complete")
}

/// Build a JSON request with the given method, URI, and body.
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Build an empty-bodied request.
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// All `Set-Cookie` header values of a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().expect("cookie should be ASCII").to_string())
        .collect()
}

/// Extract the value of a named cookie from `Set-Cookie` header values.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    cookies
        .iter()
        .find(|cookie| cookie.starts_with(&prefix))
        .and_then(|cookie| cookie.split(';').next())
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
}

/// Log the test user in over the cookie transport and return the
/// `(accessToken, refreshToken)` cookie values.
pub async fn login_cookies(app: &Router) -> (String, String) {
    let response = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            serde_json::json!({ "userName": "test", "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let cookies = set_cookies(&response);
    let access = cookie_value(&cookies, "accessToken").expect("login should set accessToken");
    let refresh = cookie_value(&cookies, "refreshToken").expect("login should set refreshToken");
    (access, refresh)
}
