//! Client configuration
//!
//! Values come from code (`with_*` setters) or from the environment via
//! [`ClientConfig::from_env`], which also loads a `.env` file if present.

use std::fmt;
use std::time::Duration;

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://djelia.cloud";

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "DJELIA_API_KEY";

/// Environment variable overriding the API host
pub const ENV_BASE_URL: &str = "BASE_URL";

/// Speaker ids accepted by TTS v1
pub const VALID_SPEAKER_IDS: [u8; 5] = [0, 1, 2, 3, 4];

/// Speaker used when none is given
pub const DEFAULT_SPEAKER_ID: u8 = 1;

/// Voices that a TTS v2 description must mention
pub const VALID_TTS_V2_SPEAKERS: [&str; 3] = ["Moussa", "Sekou", "Seydou"];

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ClientConfig {
    /// Scheme and host, without trailing slash
    pub base_url: String,
    /// API key; falls back to `DJELIA_API_KEY` when `None`
    pub api_key: Option<String>,
    /// Per-request timeout (applies until the response headers arrive for streams)
    pub timeout: Duration,
    /// Additional attempts after the first one for retryable failures
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each subsequent one
    pub retry_base_delay: Duration,
    /// Upper bound for the backoff delay
    pub retry_max_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            retry_max_delay: DEFAULT_RETRY_MAX_DELAY,
        }
    }
}

impl ClientConfig {
    /// Build a config from environment variables
    ///
    /// Reads `BASE_URL`, `DJELIA_API_KEY`, `DJELIA_TIMEOUT_SECS` and
    /// `DJELIA_MAX_RETRIES`. Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        // Silently ignore a missing .env - production uses real env vars
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let base_url = std::env::var(ENV_BASE_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.base_url);

        let timeout = std::env::var("DJELIA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let max_retries = std::env::var("DJELIA_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_retries);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: env_api_key(),
            timeout,
            max_retries,
            ..defaults
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delays(mut self, base: Duration, max: Duration) -> Self {
        self.retry_base_delay = base;
        self.retry_max_delay = max;
        self
    }

    /// Explicit key first, then the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(env_api_key)
    }

    /// Backoff before retry number `attempt` (1-based): `base * 2^(attempt-1)`, capped
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_base_delay
            .saturating_mul(factor)
            .min(self.retry_max_delay)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("retry_max_delay", &self.retry_max_delay)
            .finish()
    }
}

fn env_api_key() -> Option<String> {
    std::env::var(ENV_API_KEY).ok().filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://djelia.cloud");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:8080/")
            .with_max_retries(0);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_explicit_key_wins() {
        let config = ClientConfig::default().with_api_key("explicit");
        assert_eq!(config.resolve_api_key(), Some("explicit".to_string()));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::default().with_api_key("secret-value");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        let config = ClientConfig::default();
        assert_eq!(config.retry_delay(1), Duration::from_secs(1));
        assert_eq!(config.retry_delay(2), Duration::from_secs(2));
        assert_eq!(config.retry_delay(3), Duration::from_secs(4));
        assert_eq!(config.retry_delay(5), Duration::from_secs(10));
        assert_eq!(config.retry_delay(40), Duration::from_secs(10));
    }

    #[test]
    fn test_speaker_tables() {
        assert!(VALID_SPEAKER_IDS.contains(&DEFAULT_SPEAKER_ID));
        assert_eq!(VALID_TTS_V2_SPEAKERS.len(), 3);
    }
}
