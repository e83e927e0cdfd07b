//! Authentication gateway: every request outside the allow-list must carry
//! a verifiable access token.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use chassis_core::error::CoreError;

use crate::auth::token::SessionData;
use crate::config::TokenTransport;
use crate::error::AppError;
use crate::state::AppState;

/// Cookie carrying the access token (cookie transport).
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Header carrying the access token (header transport).
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Gate requests behind token verification.
///
/// Allow-listed paths pass through unauthenticated. Everything else needs
/// an access token in the deployment's transport; any verification failure
/// is rejected with a uniform 401 `UNAUTHORIZED` before a handler runs (the
/// underlying reason rides in the message, the status never varies). On
/// success the session data is attached as a request extension.
pub async fn auth_gateway(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();
    if state
        .config
        .auth
        .unprotected_routes
        .iter()
        .any(|route| route == path)
    {
        return Ok(next.run(req).await);
    }

    let token = match state.config.auth.token_transport {
        TokenTransport::Cookie => jar
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string()),
        TokenTransport::Header => req
            .headers()
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };

    let session = state.tokens.verify_token(token.as_deref()).await?;
    req.extensions_mut().insert(session.data);

    Ok(next.run(req).await)
}

/// Authenticated caller identity, extracted from the session data the
/// gateway attached to the request.
///
/// Use this as an extractor parameter in any handler that needs the caller:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user = %user.0.user_name, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionData);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionData>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("No session found.".into())))
    }
}
