//! Upstream configuration parsed from environment variables.

use super::types::UpstreamError;

pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeouts: UpstreamTimeouts,
}

impl UpstreamConfig {
    /// Build typed upstream config from environment variables.
    ///
    /// Required:
    /// - `UPSTREAM_URL`: completion endpoint URL
    /// - `UPSTREAM_API_KEY_ENV` (names the env var containing the key)
    ///
    /// Optional:
    /// - `UPSTREAM_TIMEOUT_SECS`: default 30 — the hard per-call deadline
    /// - `UPSTREAM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is absent.
    pub fn from_env() -> Result<Self, UpstreamError> {
        let endpoint = std::env::var("UPSTREAM_URL")
            .map_err(|_| UpstreamError::Config("UPSTREAM_URL not set".into()))?
            .trim_end_matches('/')
            .to_string();

        let key_var = std::env::var("UPSTREAM_API_KEY_ENV")
            .map_err(|_| UpstreamError::MissingApiKey { var: "UPSTREAM_API_KEY_ENV".into() })?;
        let api_key = std::env::var(&key_var).map_err(|_| UpstreamError::MissingApiKey { var: key_var.clone() })?;

        let timeouts = UpstreamTimeouts {
            request_secs: env_parse_u64("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS),
            connect_secs: env_parse_u64("UPSTREAM_CONNECT_TIMEOUT_SECS", DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { endpoint, api_key, timeouts })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
