//! Signed tokens backed by server-side session records.
//!
//! Tokens carry no user data, only a `jti` claim holding the session id; a
//! session record in the store is what makes a token usable. Revocation is
//! therefore a single key delete, and every successful verification slides
//! the session's TTL forward by the full session lifetime.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chassis_cache::Cache;
use chassis_core::error::CoreError;

use crate::config::AuthConfig;

/// Session store key prefix.
pub const SESSION_KEY_PREFIX: &str = "chassis-session:";

/// Payload held in the session record. The token only points at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user_name: String,
}

/// A verified session: the id from the token plus the stored payload.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub data: SessionData,
}

/// Access token plus, when a session was minted or extended, a refresh token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// JWT claims. `jti` is the session id; no user data is embedded.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    jti: String,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
}

/// Mints, verifies, refreshes, and revokes signed tokens against the
/// session store. Cheaply cloneable.
#[derive(Clone)]
pub struct TokenService {
    cache: Arc<dyn Cache>,
    config: Arc<AuthConfig>,
}

impl TokenService {
    pub fn new(cache: Arc<dyn Cache>, config: Arc<AuthConfig>) -> Self {
        Self { cache, config }
    }

    fn session_key(session_id: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{session_id}")
    }

    /// Derive a fresh session id: a namespace UUID computed over a random
    /// UUID.
    fn new_session_id(&self) -> String {
        Uuid::new_v5(&self.config.uuid_namespace, Uuid::new_v4().as_bytes()).to_string()
    }

    fn sign(&self, session_id: &str, ttl_secs: u64) -> Result<String, CoreError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            jti: session_id.to_string(),
            exp: now + ttl_secs as i64,
            iat: now,
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };
        encode(
            &Header::default(), // HS256
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| CoreError::Internal(format!("Token signing failed: {e}")))
    }

    fn validation(&self, validate_exp: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);
        validation.validate_exp = validate_exp;
        validation
    }

    fn decode_session_id(
        &self,
        token: &str,
        validate_exp: bool,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &self.validation(validate_exp),
        )?;
        Ok(data.claims.jti)
    }

    /// Mint an access token and, when `extend_refresh` is set, a refresh
    /// token, upserting the session record with the full session TTL.
    ///
    /// Passing an `existing_session_id` reuses that session (token
    /// refresh); otherwise a new session id is derived. With
    /// `extend_refresh` false only the access token is issued and the
    /// session record is left untouched.
    pub async fn create_token(
        &self,
        session_data: &SessionData,
        existing_session_id: Option<&str>,
        extend_refresh: bool,
    ) -> Result<TokenPair, CoreError> {
        let session_id = existing_session_id
            .map(str::to_string)
            .unwrap_or_else(|| self.new_session_id());

        let access_token = self.sign(&session_id, self.config.access_token_ttl_secs)?;
        if !extend_refresh {
            return Ok(TokenPair {
                access_token,
                refresh_token: None,
            });
        }

        let refresh_token = self.sign(&session_id, self.config.refresh_token_ttl_secs)?;

        let payload = serde_json::to_string(session_data)
            .map_err(|e| CoreError::Internal(format!("Session payload serialization failed: {e}")))?;
        self.cache
            .set_ex(
                &Self::session_key(&session_id),
                &payload,
                self.config.session_ttl_secs(),
            )
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to persist session: {e}")))?;

        Ok(TokenPair {
            access_token,
            refresh_token: Some(refresh_token),
        })
    }

    /// Verify a token and resolve its session.
    ///
    /// Fails `Unauthorized` when the token is missing, fails signature /
    /// issuer / audience / expiry checks (the underlying reason rides in
    /// the message), or references no live session record -- which covers
    /// logout, session expiry, and an unreachable store alike: a store
    /// failure rejects the request, it never silently authorizes.
    ///
    /// On success the session TTL is reset to its full value (sliding
    /// expiration). Concurrent verifications race on that write, but both
    /// set the same payload with a fresh TTL, so last-writer-wins is fine.
    pub async fn verify_token(&self, token: Option<&str>) -> Result<Session, CoreError> {
        let token = token.ok_or_else(|| CoreError::Unauthorized("No token found.".into()))?;

        let session_id = self
            .decode_session_id(token, true)
            .map_err(|e| CoreError::Unauthorized(e.to_string()))?;

        let key = Self::session_key(&session_id);
        let payload = match self.cache.get(&key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return Err(CoreError::Unauthorized("No session found.".into())),
            Err(err) => {
                tracing::warn!(error = %err, "Session store lookup failed");
                return Err(CoreError::Unauthorized("No session found.".into()));
            }
        };
        let data: SessionData = serde_json::from_str(&payload)
            .map_err(|_| CoreError::Unauthorized("No session found.".into()))?;

        if let Err(err) = self
            .cache
            .set_ex(&key, &payload, self.config.session_ttl_secs())
            .await
        {
            tracing::warn!(error = %err, "Failed to refresh session TTL");
        }

        Ok(Session { session_id, data })
    }

    /// Exchange a refresh token for a new token pair on the same session.
    pub async fn extend_token(&self, refresh_token: Option<&str>) -> Result<TokenPair, CoreError> {
        let session = self.verify_token(refresh_token).await?;
        self.create_token(&session.data, Some(&session.session_id), true)
            .await
    }

    /// Best-effort session deletion for logout.
    ///
    /// Decodes with expiry validation disabled so an already-expired access
    /// token still identifies its session; a bad signature means there is
    /// nothing trustworthy to delete. Every failure is swallowed, making
    /// logout idempotent.
    pub async fn clear_session(&self, token: Option<&str>) {
        let Some(token) = token else { return };
        let Ok(session_id) = self.decode_session_id(token, false) else {
            return;
        };
        if let Err(err) = self.cache.del(&Self::session_key(&session_id)).await {
            tracing::debug!(error = %err, "Session delete failed during logout");
        }
    }
}
