//! Client settings
//!
//! Settings are layered: built-in defaults, then an optional configuration
//! file, then `TAXIS99_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::transport::{HttpTransport, HttpTransportBuilder};

/// Base URL of the production API
pub const DEFAULT_BASE_URL: &str = "https://api.99taxis.com/";

/// Prefix of the environment variables overriding [`Settings`]
pub const ENV_PREFIX: &str = "TAXIS99";

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL every request path is resolved against
    pub base_url: String,
    /// Request timeout in seconds. No timeout when unset
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header value
    pub user_agent: Option<String>,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Only proxy hosts matching this regex. All hosts when unset
    pub proxy_host_pattern: Option<String>,
    /// Accept invalid TLS certificates
    pub accept_invalid_certs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            user_agent: Some(format!("taxis99-rs/{}", env!("CARGO_PKG_VERSION"))),
            proxy: None,
            proxy_host_pattern: None,
            accept_invalid_certs: false,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional config file and the environment
    pub fn load<P>(config_file: Option<P>) -> Result<Self, Error>
    where
        P: Into<PathBuf>,
    {
        Self::load_with_env(config_file, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env<P>(config_file: Option<P>, environment: Environment) -> Result<Self, Error>
    where
        P: Into<PathBuf>,
    {
        let default_settings = Self::default();

        let mut builder = Config::builder()
            // use defaults
            .add_source(Config::try_from(&default_settings)?);

        if let Some(path) = config_file {
            // override with file contents
            builder = builder.add_source(File::from(path.into()));
        }

        let config = builder
            .add_source(environment.try_parsing(true))
            .build()?;
        let settings: Settings = config.try_deserialize()?;

        tracing::debug!("Loaded settings: {:?}", settings);

        Ok(settings)
    }

    /// Parsed [`Settings::base_url`]
    pub fn base_url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Request timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Build the default transport described by these settings
    pub fn transport(&self) -> Result<HttpTransport, Error> {
        let mut builder: HttpTransportBuilder =
            HttpTransport::builder().danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        if let Some(proxy) = &self.proxy {
            let proxy = Url::parse(proxy).map_err(|e| Error::Proxy(e.to_string()))?;
            builder = match &self.proxy_host_pattern {
                Some(pattern) => builder.proxy_with_matcher(proxy, pattern)?,
                None => builder.proxy(proxy),
            };
        }

        builder.build()
    }
}
