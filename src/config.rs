use std::env;
use std::time::Duration;

use crate::spotify::{DEFAULT_ACCOUNTS_BASE, DEFAULT_API_BASE};

/// Application configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub api_base: String,
    pub accounts_base: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8081);

        let http_timeout = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} is required", key))
        };

        let spotify_client_id = required("SPOTIFY_CLIENT_ID")?;
        let spotify_client_secret = required("SPOTIFY_CLIENT_SECRET")?;
        let spotify_redirect_uri = required("SPOTIFY_REDIRECT_URI")?;

        let api_base = lookup("SPOTIFY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into());
        let accounts_base =
            lookup("SPOTIFY_ACCOUNTS_BASE").unwrap_or_else(|| DEFAULT_ACCOUNTS_BASE.into());

        Ok(Self {
            port,
            spotify_client_id,
            spotify_client_secret,
            spotify_redirect_uri,
            api_base: api_base.trim_end_matches('/').to_string(),
            accounts_base: accounts_base.trim_end_matches('/').to_string(),
            http_timeout,
        })
    }
}
