//! Handlers for the `/auth` resource (login, refresh, logout).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use serde::Deserialize;
use validator::Validate;

use crate::auth::token::TokenPair;
use crate::config::TokenTransport;
use crate::error::AppResult;
use crate::middleware::auth::{ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_HEADER};
use crate::state::AppState;

/// Cookie carrying the refresh token (cookie transport).
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Header carrying the refresh token (header transport).
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// The refresh cookie is scoped to the renewal endpoint so it is not sent
/// with every request.
pub const REFRESH_COOKIE_PATH: &str = "/auth/refresh";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub user_name: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/login
///
/// Authenticate with username + password. Returns the token pair as
/// cookies or as a JSON body, depending on the deployment transport.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> AppResult<Response> {
    input.validate()?;
    let tokens = state.auth.login(&input.user_name, &input.password).await?;
    Ok(token_response(&state, jar, tokens))
}

/// POST /auth/refresh
///
/// Exchange a valid refresh token for a rotated pair on the same session.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<Response> {
    let refresh_token = match state.config.auth.token_transport {
        TokenTransport::Cookie => jar
            .get(REFRESH_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string()),
        TokenTransport::Header => headers
            .get(REFRESH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };

    let tokens = state.auth.refresh_session(refresh_token.as_deref()).await?;
    Ok(token_response(&state, jar, tokens))
}

/// POST /auth/logout
///
/// Always 200. Clears the session record (best-effort) and, in the cookie
/// transport, removes both cookies with an epoch-zero expiry.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<Response> {
    let access_token = match state.config.auth.token_transport {
        TokenTransport::Cookie => jar
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string()),
        TokenTransport::Header => headers
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };

    state.auth.logout(access_token.as_deref()).await;

    match state.config.auth.token_transport {
        TokenTransport::Cookie => {
            let jar = jar
                .remove(Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").build())
                .remove(
                    Cookie::build((REFRESH_TOKEN_COOKIE, ""))
                        .path(REFRESH_COOKIE_PATH)
                        .build(),
                );
            Ok((jar, StatusCode::OK).into_response())
        }
        TokenTransport::Header => Ok(StatusCode::OK.into_response()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deliver a token pair per the deployment transport: `Set-Cookie` headers
/// with an empty 200 body, or the pair as a JSON body.
fn token_response(state: &AppState, jar: CookieJar, tokens: TokenPair) -> Response {
    match state.config.auth.token_transport {
        TokenTransport::Header => Json(tokens).into_response(),
        TokenTransport::Cookie => {
            let auth = &state.config.auth;
            let secure = state.config.env.secure_cookies();

            let mut jar = jar.add(build_cookie(
                ACCESS_TOKEN_COOKIE,
                tokens.access_token,
                "/",
                auth.access_token_ttl_secs,
                secure,
            ));
            if let Some(refresh_token) = tokens.refresh_token {
                jar = jar.add(build_cookie(
                    REFRESH_TOKEN_COOKIE,
                    refresh_token,
                    REFRESH_COOKIE_PATH,
                    auth.refresh_token_ttl_secs,
                    secure,
                ));
            }
            (jar, StatusCode::OK).into_response()
        }
    }
}

/// Build a token cookie: `HttpOnly` so client-side scripts cannot read it,
/// `SameSite=Strict`, and `Secure` outside dev/test environments.
fn build_cookie(
    name: &'static str,
    value: String,
    path: &'static str,
    max_age_secs: u64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path(path)
        .max_age(CookieDuration::seconds(max_age_secs as i64))
        .build()
}
