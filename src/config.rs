// src/config.rs

use std::env;
use dotenvy::dotenv;
use url::Url;

/// Remote assessment API used when the portal is served from `localhost`.
pub const LOCAL_API_URL: &str = "http://localhost:4000";

/// Version tag written into every persisted session payload.
pub const SESSION_STATE_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: Url,
    pub database_url: String,
    pub jwt_secret: String,
    /// Lifetime of a portal session token, in seconds.
    pub jwt_expiration: u64,
    /// Lifetime of the token re-issued after a "remember me" sign-in.
    pub remember_me_expiration: u64,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let hostname = env::var("PORTAL_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let deployment_url = env::var("DEPLOYMENT_URL").ok();

        let api_base_url = resolve_api_base_url(&hostname, deployment_url.as_deref())
            .expect("DEPLOYMENT_URL must be a valid URL when PORTAL_HOSTNAME is not localhost");

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://portal.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(28_800);

        let remember_me_expiration = env::var("REMEMBER_ME_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2_592_000);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        Self {
            api_base_url,
            database_url,
            jwt_secret,
            jwt_expiration,
            remember_me_expiration,
            rust_log,
            port,
        }
    }
}

/// Picks the remote API base for the hostname the portal is served under.
///
/// `localhost` always talks to the local API; any other hostname needs a
/// parseable deployment URL.
pub fn resolve_api_base_url(hostname: &str, deployment_url: Option<&str>) -> Option<Url> {
    if hostname == "localhost" {
        return Url::parse(LOCAL_API_URL).ok();
    }

    deployment_url.and_then(|raw| Url::parse(raw.trim()).ok())
}
