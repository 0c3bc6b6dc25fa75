//! HTTP layer configuration.

use std::env;
use std::time::Duration;

use crate::{Error, Result};

/// Default environment variable prefix for [`HttpConfig::from_env`].
pub const ENV_PREFIX: &str = "ROUTEKIT";

/// HTTP layer configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL for all requests.
    pub base_url: Option<String>,
    /// Default request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Default headers for all requests.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip compression.
    pub gzip: bool,
    /// Enable brotli compression.
    pub brotli: bool,
    /// Follow redirects.
    pub follow_redirects: bool,
    /// Maximum redirects to follow.
    pub max_redirects: usize,
    /// Serve configured mocks instead of sending requests.
    pub enable_mocks: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_headers: Vec::new(),
            user_agent: format!("routekit-http/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
            brotli: true,
            follow_redirects: true,
            max_redirects: 10,
            enable_mocks: true,
        }
    }
}

impl HttpConfig {
    /// Create a new configuration builder.
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::default()
    }

    /// Load overrides from `ROUTEKIT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_env_prefixed(ENV_PREFIX)
    }

    /// Load overrides from `<PREFIX>_*` environment variables.
    ///
    /// Recognized keys: `BASE_URL`, `TIMEOUT_MS`, `CONNECT_TIMEOUT_MS`,
    /// `USER_AGENT` and `ENABLE_MOCKS`. Unset keys keep their defaults.
    pub fn from_env_prefixed(prefix: &str) -> Result<Self> {
        Self::from_lookup(|key| env::var(format!("{}_{}", prefix, key)).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(base_url) = lookup("BASE_URL") {
            url::Url::parse(&base_url)?;
            config.base_url = Some(base_url);
        }
        if let Some(value) = lookup("TIMEOUT_MS") {
            config.timeout = parse_millis("TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("CONNECT_TIMEOUT_MS") {
            config.connect_timeout = parse_millis("CONNECT_TIMEOUT_MS", &value)?;
        }
        if let Some(user_agent) = lookup("USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(value) = lookup("ENABLE_MOCKS") {
            config.enable_mocks = parse_bool("ENABLE_MOCKS", &value)?;
        }

        Ok(config)
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| Error::Config(format!("{key}: {e}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("{key}: expected a boolean, got {other:?}"))),
    }
}

/// Builder for HTTP layer configuration.
#[derive(Debug, Default)]
pub struct HttpConfigBuilder {
    config: HttpConfig,
}

impl HttpConfigBuilder {
    /// Set the base URL for all requests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Add a default header for all requests.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable gzip compression.
    pub fn gzip(mut self, enable: bool) -> Self {
        self.config.gzip = enable;
        self
    }

    /// Enable or disable brotli compression.
    pub fn brotli(mut self, enable: bool) -> Self {
        self.config.brotli = enable;
        self
    }

    /// Enable or disable following redirects.
    pub fn follow_redirects(mut self, enable: bool) -> Self {
        self.config.follow_redirects = enable;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Enable or disable mocked routes.
    pub fn enable_mocks(mut self, enable: bool) -> Self {
        self.config.enable_mocks = enable;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> HttpConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_builder() {
        let config = HttpConfig::builder()
            .base_url("https://api.example.com")
            .timeout(Duration::from_secs(5))
            .default_header("X-App", "routekit")
            .enable_mocks(false)
            .build();

        assert_eq!(config.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.default_headers.len(), 1);
        assert!(!config.enable_mocks);
    }

    #[test]
    fn test_lookup_overrides() {
        let config = HttpConfig::from_lookup(lookup(&[
            ("BASE_URL", "https://api.example.com/v1/"),
            ("TIMEOUT_MS", "1500"),
            ("ENABLE_MOCKS", "off"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.as_deref(), Some("https://api.example.com/v1/"));
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert!(!config.enable_mocks);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_lookup_rejects_bad_values() {
        let error = HttpConfig::from_lookup(lookup(&[("TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(matches!(error, Error::Config(_)));

        let error = HttpConfig::from_lookup(lookup(&[("BASE_URL", "not a url")])).unwrap_err();
        assert!(matches!(error, Error::InvalidUrl(_)));

        let error = HttpConfig::from_lookup(lookup(&[("ENABLE_MOCKS", "maybe")])).unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn test_from_env_without_variables() {
        let config = HttpConfig::from_env_prefixed("ROUTEKIT_TEST_UNSET_99999").unwrap();
        assert!(config.base_url.is_none());
        assert!(config.enable_mocks);
    }
}
