use uuid::Uuid;

/// Where clients present tokens: an `accessToken`/`refreshToken` cookie
/// pair, or `x-access-token`/`x-refresh-token` headers. One deployment uses
/// exactly one transport; they are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTransport {
    Cookie,
    Header,
}

/// Deployment environment, controlling the `Secure` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Dev,
    Test,
    Prod,
}

impl AppEnv {
    /// Cookies are `Secure` everywhere except local dev and test runs.
    pub fn secure_cookies(self) -> bool {
        matches!(self, AppEnv::Prod)
    }
}

/// Authentication configuration (token signing, session TTLs, the
/// configured user, and the route allow-list).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub jwt_secret: String,
    /// `iss` claim, fixed per deployment.
    pub jwt_issuer: String,
    /// `aud` claim, fixed per deployment.
    pub jwt_audience: String,
    /// Namespace for deriving session ids (v5 UUID over a random v4).
    pub uuid_namespace: Uuid,
    /// Access token lifetime in seconds (default: 3600).
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds (default: 86400). The session
    /// record in the store always carries this TTL.
    pub refresh_token_ttl_secs: u64,
    /// Username of the single configured user.
    pub username: String,
    /// Plaintext password of the configured user; hashed at startup.
    pub password: String,
    /// Request paths exempt from authentication.
    pub unprotected_routes: Vec<String>,
    /// Cookie or header token delivery.
    pub token_transport: TokenTransport,
}

impl AuthConfig {
    /// The session record TTL equals the refresh token TTL: every
    /// successful verification slides the session forward by this much.
    pub fn session_ttl_secs(&self) -> u64 {
        self.refresh_token_ttl_secs
    }

    /// Load authentication configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default                            |
    /// |--------------------------|----------|------------------------------------|
    /// | `JWT_SECRET`             | **yes**  | --                                 |
    /// | `JWT_ISSUER`             | no       | `chassis`                          |
    /// | `JWT_AUDIENCE`           | no       | `chassis-clients`                  |
    /// | `UUID_NAMESPACE`         | **yes**  | --                                 |
    /// | `ACCESS_TOKEN_TTL_SECS`  | no       | `3600`                             |
    /// | `REFRESH_TOKEN_TTL_SECS` | no       | `86400`                            |
    /// | `AUTH_USERNAME`          | no       | `test`                             |
    /// | `AUTH_PASSWORD`          | **yes**  | --                                 |
    /// | `UNPROTECTED_ROUTES`     | no       | `/health,/auth/login,/auth/refresh`|
    /// | `TOKEN_TRANSPORT`        | no       | `cookie`                           |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or a value fails to parse.
    pub fn from_env() -> Self {
        let jwt_secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!jwt_secret.is_empty(), "JWT_SECRET must not be empty");

        let jwt_issuer = std::env::var("JWT_ISSUER").unwrap_or_else(|_| "chassis".into());
        let jwt_audience =
            std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "chassis-clients".into());

        let uuid_namespace = std::env::var("UUID_NAMESPACE")
            .expect("UUID_NAMESPACE must be set in the environment")
            .parse::<Uuid>()
            .expect("UUID_NAMESPACE must be a valid UUID");

        let access_token_ttl_secs: u64 = std::env::var("ACCESS_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("ACCESS_TOKEN_TTL_SECS must be a valid u64");

        let refresh_token_ttl_secs: u64 = std::env::var("REFRESH_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "86400".into())
            .parse()
            .expect("REFRESH_TOKEN_TTL_SECS must be a valid u64");

        let username = std::env::var("AUTH_USERNAME").unwrap_or_else(|_| "test".into());
        let password =
            std::env::var("AUTH_PASSWORD").expect("AUTH_PASSWORD must be set in the environment");

        let unprotected_routes: Vec<String> = std::env::var("UNPROTECTED_ROUTES")
            .unwrap_or_else(|_| "/health,/auth/login,/auth/refresh".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let token_transport = match std::env::var("TOKEN_TRANSPORT")
            .unwrap_or_else(|_| "cookie".into())
            .as_str()
        {
            "cookie" => TokenTransport::Cookie,
            "header" => TokenTransport::Header,
            other => panic!("TOKEN_TRANSPORT must be 'cookie' or 'header', got '{other}'"),
        };

        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            uuid_namespace,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            username,
            password,
            unprotected_routes,
            token_transport,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except secrets have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Deployment environment (default: `dev`).
    pub env: AppEnv,
    /// Redis connection URL.
    pub redis_url: String,
    /// Postgres connection URL.
    pub database_url: String,
    /// Authentication configuration.
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `APP_ENV`              | `dev`                      |
    /// | `REDIS_URL`            | `redis://127.0.0.1:6379`   |
    /// | `DATABASE_URL`         | **required**               |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let env = match std::env::var("APP_ENV").unwrap_or_else(|_| "dev".into()).as_str() {
            "dev" => AppEnv::Dev,
            "test" => AppEnv::Test,
            "prod" => AppEnv::Prod,
            other => panic!("APP_ENV must be 'dev', 'test' or 'prod', got '{other}'"),
        };

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());

        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let auth = AuthConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            env,
            redis_url,
            database_url,
            auth,
        }
    }
}
