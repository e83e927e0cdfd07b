//! Login, refresh, and logout against the single configured user.

use chassis_core::error::CoreError;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{SessionData, TokenPair, TokenService};
use crate::config::AuthConfig;

/// Authentication flows over the [`TokenService`]. The configured user's
/// password is hashed once at construction; the plaintext is not retained.
#[derive(Clone)]
pub struct AuthService {
    user_name: String,
    password_hash: String,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(config: &AuthConfig, tokens: TokenService) -> Result<Self, CoreError> {
        let password_hash = hash_password(&config.password)
            .map_err(|e| CoreError::Internal(format!("Failed to hash configured password: {e}")))?;
        Ok(Self {
            user_name: config.username.clone(),
            password_hash,
            tokens,
        })
    }

    /// Check credentials and mint a fresh token pair with a new session.
    pub async fn login(&self, user_name: &str, password: &str) -> Result<TokenPair, CoreError> {
        let valid = self.user_name == user_name
            && verify_password(password, &self.password_hash)
                .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))?;
        if !valid {
            return Err(CoreError::Unauthorized(
                "Invalid username or password.".into(),
            ));
        }

        self.tokens
            .create_token(
                &SessionData {
                    user_name: user_name.to_string(),
                },
                None,
                true,
            )
            .await
    }

    /// Exchange a refresh token for a rotated pair on the same session.
    pub async fn refresh_session(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<TokenPair, CoreError> {
        self.tokens.extend_token(refresh_token).await
    }

    /// Best-effort logout; never fails.
    pub async fn logout(&self, access_token: Option<&str>) {
        self.tokens.clear_session(access_token).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chassis_cache::MemoryCache;
    use uuid::Uuid;

    use super::*;
    use crate::config::TokenTransport;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            jwt_issuer: "chassis".to_string(),
            jwt_audience: "chassis-clients".to_string(),
            uuid_namespace: Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 86400,
            username: "test".to_string(),
            password: "secret-password".to_string(),
            unprotected_routes: vec![],
            token_transport: TokenTransport::Cookie,
        }
    }

    fn auth_service() -> AuthService {
        let config = test_config();
        let tokens = TokenService::new(Arc::new(MemoryCache::new()), Arc::new(config.clone()));
        AuthService::new(&config, tokens).expect("construction should succeed")
    }

    #[tokio::test]
    async fn test_login_with_valid_credentials() {
        let service = auth_service();
        let pair = service.login("test", "secret-password").await.unwrap();
        assert!(!pair.access_token.is_empty());
        assert!(pair.refresh_token.is_some());
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_fails() {
        let service = auth_service();
        let result = service.login("test", "wrong").await;
        assert!(matches!(result, Err(CoreError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_with_unknown_user_fails() {
        let service = auth_service();
        let result = service.login("ghost", "secret-password").await;
        assert!(matches!(result, Err(CoreError::Unauthorized(_))));
    }
}
