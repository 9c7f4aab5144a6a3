use std::time::Duration;

use crate::prelude::*;

pub mod client;
pub mod issues;
pub mod project;

pub use client::GitLabClient;

/// GitLab connection settings
#[derive(Debug, Clone)]
pub struct GitLabConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl GitLabConfig {
    /// Default GitLab instance
    pub const DEFAULT_BASE_URL: &'static str = "https://gitlab.com";

    /// Default per-request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build the configuration from the global CLI values.
    ///
    /// Clap has already applied the GITLAB_TOKEN, GITLAB_BASE_URL and
    /// GITLAB_TIMEOUT_SECS fallbacks; this only fills in defaults.
    pub fn load(
        base_url: Option<String>,
        token: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let token = token.ok_or_else(|| eyre!("GITLAB_TOKEN environment variable not set"))?;
        let base_url = base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        let timeout = match timeout_secs {
            Some(0) => return Err(eyre!("GITLAB_TIMEOUT_SECS must be greater than zero")),
            Some(secs) => secs,
            None => Self::DEFAULT_TIMEOUT_SECS,
        };

        let mut config = Self::new(base_url, token);
        config.timeout = Duration::from_secs(timeout);
        Ok(config)
    }

    /// Web root of the instance, without a trailing slash
    pub fn web_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// REST API v4 root
    pub fn api_base(&self) -> String {
        format!("{}/api/v4", self.web_base())
    }
}

/// Create an HTTP client that sends the PRIVATE-TOKEN header on every request
pub fn create_gitlab_client(config: &GitLabConfig) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};

    let mut token = HeaderValue::from_str(&config.token)
        .map_err(|e| eyre!("Invalid header value: {}", e))?;
    token.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static("private-token"), token);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}
