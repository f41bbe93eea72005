//! Configuration management for finsum using the prefer crate.

use serde::{Deserialize, Serialize};

/// Default document service endpoint.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

/// Default request timeout in seconds (5 min; summarization backends are slow).
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 300;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the document service.
    pub service_url: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Maximum service calls in flight during batch operations (1 = sequential).
    pub max_concurrent_requests: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: format!("finsum/{}", env!("CARGO_PKG_VERSION")),
            max_concurrent_requests: 1,
        }
    }
}

impl Settings {
    /// Override the service URL.
    pub fn with_service_url(mut self, url: &str) -> Self {
        self.service_url = url.to_string();
        self
    }

    /// Override the batch concurrency; values below 1 are clamped to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrent_requests = concurrency.max(1);
        self
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Document service base URL.
    #[serde(default)]
    pub service_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Maximum concurrent service calls during batch operations.
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers finsum config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("finsum").await {
            Ok(pref_config) => {
                let service_url: Option<String> = pref_config.get("service_url").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();
                let max_concurrent_requests: Option<usize> =
                    pref_config.get("max_concurrent_requests").ok();

                Config {
                    service_url,
                    request_timeout,
                    user_agent,
                    max_concurrent_requests,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref url) = self.service_url {
            settings.service_url = url.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(concurrency) = self.max_concurrent_requests {
            settings.max_concurrent_requests = concurrency.max(1);
        }
    }
}

/// Load settings from configuration.
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}
