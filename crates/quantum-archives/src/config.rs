//! Configuration for the Quantum Archives client.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Gemini REST API.
    pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Model used for both discovery and chat.
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    /// Primary environment variable holding the API key.
    pub const API_KEY_VAR: &str = "API_KEY";

    /// Fallback environment variable holding the API key.
    pub const API_KEY_FALLBACK_VAR: &str = "GEMINI_API_KEY";

    /// Environment variable overriding the model.
    pub const MODEL_VAR: &str = "GEMINI_MODEL";

    /// Environment variable overriding the API base URL.
    pub const BASE_URL_VAR: &str = "GEMINI_API_BASE_URL";

    /// Request timeout. Grounded chat answers can take a while.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 4;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Generation defaults.
pub mod generation {
    /// Papers requested per physicist.
    pub const PAPERS_PER_PHYSICIST: usize = 6;

    /// Low randomness keeps the paper lists factual.
    pub const DISCOVERY_TEMPERATURE: f32 = 0.3;

    /// Prior chat messages forwarded to the model.
    pub const HISTORY_WINDOW: usize = 6;
}

/// Client configuration.
#[derive(Clone)]
pub struct Config {
    /// Gemini API key (optional; calls fail and degrade without it).
    pub api_key: Option<String>,

    /// Base URL for the generative API (for testing with mock servers).
    pub api_base_url: String,

    /// Model name, e.g. `gemini-2.5-flash`.
    pub model: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Number of papers asked for on each discovery.
    pub papers_per_physicist: usize,

    /// Sampling temperature for discovery requests.
    pub discovery_temperature: f32,

    /// Number of prior chat messages forwarded as context.
    pub history_window: usize,
}

impl Config {
    /// Create a new configuration with an optional API key and default endpoints.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            api_base_url: api::BASE_URL.to_string(),
            model: api::DEFAULT_MODEL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            papers_per_physicist: generation::PAPERS_PER_PHYSICIST,
            discovery_temperature: generation::DISCOVERY_TEMPERATURE,
            history_window: generation::HISTORY_WINDOW,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            api_base_url: format!("{}/v1beta", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Self::new(None)
        }
    }

    /// Create configuration from environment variables.
    ///
    /// A missing API key is not an error here; the client reports it once
    /// it is built.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(api::API_KEY_VAR)
            .or_else(|| lookup(api::API_KEY_FALLBACK_VAR))
            .filter(|key| !key.trim().is_empty());

        let mut config = Self::new(api_key);
        if let Some(model) = lookup(api::MODEL_VAR).filter(|m| !m.is_empty()) {
            config.model = model;
        }
        if let Some(url) = lookup(api::BASE_URL_VAR).filter(|u| !u.is_empty()) {
            config.api_base_url = url;
        }
        config
    }

    /// Apply command-line values over the environment.
    ///
    /// Blank keys and empty strings leave the current value in place.
    #[must_use]
    pub fn with_overrides(
        mut self,
        api_key: Option<String>,
        model: Option<String>,
        api_base_url: Option<String>,
    ) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(model) = model.filter(|m| !m.is_empty()) {
            self.model = model;
        }
        if let Some(url) = api_base_url.filter(|u| !u.is_empty()) {
            self.api_base_url = url;
        }
        self
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_api_key", &self.has_api_key())
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(!config.has_api_key());
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.papers_per_physicist, 6);
        assert_eq!(config.history_window, 6);
    }

    #[test]
    fn test_config_from_lookup_primary_key() {
        let config = Config::from_lookup(lookup_from(&[("API_KEY", "k1"), ("GEMINI_API_KEY", "k2")]));
        assert_eq!(config.api_key.as_deref(), Some("k1"));
    }

    #[test]
    fn test_config_from_lookup_fallback_key() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k2")]));
        assert_eq!(config.api_key.as_deref(), Some("k2"));
    }

    #[test]
    fn test_config_missing_key_is_not_fatal() {
        let config = Config::from_lookup(lookup_from(&[("API_KEY", "   ")]));
        assert!(!config.has_api_key());
        assert_eq!(config.api_base_url, api::BASE_URL);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_API_BASE_URL", "http://localhost:9000/v1beta"),
        ]));
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.api_base_url, "http://localhost:9000/v1beta");
    }

    #[test]
    fn test_cli_key_overrides_missing_env_key() {
        let config = Config::from_lookup(lookup_from(&[])).with_overrides(
            Some("cli-key".to_string()),
            None,
            None,
        );
        assert_eq!(config.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_blank_overrides_keep_env_values() {
        let config = Config::from_lookup(lookup_from(&[("API_KEY", "env-key")])).with_overrides(
            Some("  ".to_string()),
            Some(String::new()),
            None,
        );
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_debug_hides_key() {
        let config = Config::new(Some("super-secret".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("has_api_key: true"));
    }
}
