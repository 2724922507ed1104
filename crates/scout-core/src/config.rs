//! Configuration module
//!
//! Client settings are resolved once at process start from the environment
//! (optionally seeded from a `.env` file). Every setting has a fallback, so an
//! empty environment targets a backend on `http://127.0.0.1:8000`.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_POLL_INTERVAL_MS, DEFAULT_USER_ID, MAX_SINGLE_PUT_BYTES,
};
use crate::error::{ScoutError, ScoutResult};
use crate::validation::validate_user_id;

const REQUEST_TIMEOUT_SECS: u64 = 60;
// Matches the backend's default presign TTL.
const UPLOAD_TIMEOUT_SECS: u64 = 900;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub user_id: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub max_upload_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(UPLOAD_TIMEOUT_SECS),
            max_upload_bytes: MAX_SINGLE_PUT_BYTES,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> ScoutResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> ScoutResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("SCOUT_API_BASE")
            .or_else(|| lookup("API_BASE"))
            .unwrap_or(defaults.api_base_url);

        let user_id = lookup("SCOUT_USER_ID").unwrap_or(defaults.user_id);

        let poll_interval_ms = parse_var(
            &lookup,
            "SCOUT_POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL_MS,
        )?;
        let request_timeout_secs =
            parse_var(&lookup, "SCOUT_REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS)?;
        let upload_timeout_secs =
            parse_var(&lookup, "SCOUT_UPLOAD_TIMEOUT_SECS", UPLOAD_TIMEOUT_SECS)?;
        let max_upload_bytes =
            parse_var(&lookup, "SCOUT_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?;

        let config = Self {
            api_base_url: api_base_url.trim().trim_end_matches('/').to_string(),
            user_id,
            poll_interval: Duration::from_millis(poll_interval_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            upload_timeout: Duration::from_secs(upload_timeout_secs),
            max_upload_bytes,
        };
        config.validate()?;

        tracing::debug!(
            api_base_url = %config.api_base_url,
            poll_interval_ms = poll_interval_ms,
            "Client configuration loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> ScoutResult<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ScoutError::Config(format!(
                "SCOUT_API_BASE must start with http:// or https://, got: {}",
                self.api_base_url
            )));
        }
        validate_user_id(&self.user_id)
            .map_err(|e| ScoutError::Config(format!("SCOUT_USER_ID is invalid: {}", e)))?;
        if self.poll_interval.is_zero() {
            return Err(ScoutError::Config(
                "SCOUT_POLL_INTERVAL_MS must be greater than 0".into(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(ScoutError::Config(
                "SCOUT_MAX_UPLOAD_BYTES must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn parse_var<F>(lookup: &F, key: &str, default: u64) -> ScoutResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ScoutError::Config(format!("{} must be a valid number, got: {}", key, raw))),
        None => Ok(default),
    }
}
