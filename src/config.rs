use serde::Deserialize;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_u64_or(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

/// Configuration for the credential service binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AuthConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
        };
        let port = env_or("PORT", "3001").parse()?;
        Ok(Self {
            port,
            database_url,
            jwt,
        })
    }
}

/// One backend behind the gateway: where to find it and how its
/// prefix is rewritten before forwarding.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub name: String,
    pub prefix: String,
    pub target: String,
    pub rewrite: String,
}

/// Configuration for the gateway binary.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub backends: Vec<BackendConfig>,
    /// Upper bound on a proxied request, per route.
    pub proxy_timeout_ms: u64,
    /// Upper bound on a single health probe; shorter than the proxy
    /// timeout so a dead backend cannot stall the aggregate response.
    pub probe_timeout_ms: u64,
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env_or("PORT", "3000").parse()?;
        let backends = vec![
            backend("auth", "/api/auth", "AUTH_SERVICE_URL", "http://localhost:3001"),
            backend("users", "/api/users", "USER_SERVICE_URL", "http://localhost:3002"),
            backend("posts", "/api/posts", "POST_SERVICE_URL", "http://localhost:3003"),
            backend("cart", "/api/cart", "CART_SERVICE_URL", "http://localhost:3004"),
            backend(
                "favorites",
                "/api/favorites",
                "FAVORITES_SERVICE_URL",
                "http://localhost:3005",
            ),
            backend(
                "notifications",
                "/api/notifications",
                "NOTIFICATION_SERVICE_URL",
                "http://localhost:3006",
            ),
        ];
        Ok(Self {
            port,
            backends,
            proxy_timeout_ms: env_u64_or("PROXY_TIMEOUT_MS", 10_000),
            probe_timeout_ms: env_u64_or("PROBE_TIMEOUT_MS", 2_000),
        })
    }
}

fn backend(name: &str, prefix: &str, url_var: &str, default_url: &str) -> BackendConfig {
    BackendConfig {
        name: name.into(),
        prefix: prefix.into(),
        target: env_or(url_var, default_url),
        rewrite: String::new(),
    }
}
