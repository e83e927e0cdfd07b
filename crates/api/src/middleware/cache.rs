//! Response cache: successful GET responses are cached per user and URI.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use chassis_cache::Cache;

use crate::auth::token::SessionData;
use crate::error::AppError;
use crate::state::AppState;

/// Response cache key prefix.
pub const CACHE_KEY_PREFIX: &str = "chassis-cache:";

/// Cached response lifetime.
const RESPONSE_TTL_SECS: u64 = 60 * 60;

/// Upper bound when buffering a response body for caching.
const MAX_CACHED_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Serve GET responses from the cache, keyed by user and request URI.
///
/// Runs after the auth gateway: unauthenticated (allow-listed) requests
/// bypass the cache, as do non-GET methods. On a hit the handler never
/// runs. On a miss, successful JSON responses are stored with a fixed TTL.
/// Cache failures in either direction are logged and ignored -- the cache
/// never breaks a request.
pub async fn cache_responses(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() != Method::GET {
        return Ok(next.run(req).await);
    }
    let Some(session) = req.extensions().get::<SessionData>() else {
        return Ok(next.run(req).await);
    };

    let key = format!("{CACHE_KEY_PREFIX}{}:{}", session.user_name, req.uri());

    match state.cache.get(&key).await {
        Ok(Some(cached)) => {
            tracing::debug!(%key, "Serving cached response");
            return Ok((
                [(header::CONTENT_TYPE, "application/json")],
                cached,
            )
                .into_response());
        }
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "Cache lookup failed"),
    }

    let response = next.run(req).await;
    if !response.status().is_success() || !is_json(&response) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_CACHED_BODY_BYTES)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to buffer response body: {e}")))?;

    if let Ok(text) = std::str::from_utf8(&bytes) {
        if let Err(err) = state.cache.set_ex(&key, text, RESPONSE_TTL_SECS).await {
            tracing::warn!(error = %err, "Failed to cache response");
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}
