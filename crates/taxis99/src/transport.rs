//! HTTP Transport trait with a default implementation

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Request, Response};
use url::Url;

use crate::error::Error;

/// Executes a single HTTP request
///
/// The [`Client`](crate::Client) builds the request and interprets the
/// response; a transport only moves it over the wire. Implement this trait to
/// substitute the network in tests or to route requests through custom
/// infrastructure.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
    /// Send the request and return the response head with an unread body
    async fn execute(&self, request: Request) -> Result<Response, Error>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn execute(&self, request: Request) -> Result<Response, Error> {
        (**self).execute(request).await
    }
}

/// Transport backed by a [`reqwest::Client`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a new transport with default settings
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Create a new transport builder
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Create a transport from an existing reqwest::Client
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: Request) -> Result<Response, Error> {
        self.inner.execute(request).await.map_err(Error::from)
    }
}

/// Builder for [`HttpTransport`] for configuring timeouts, proxy and TLS settings
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
    proxy: Option<ProxyConfig>,
}

#[derive(Debug)]
struct ProxyConfig {
    url: Url,
    matcher: Option<regex::Regex>,
}

impl HttpTransportBuilder {
    /// Total timeout for each request, from dispatch until the body is read
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of the `User-Agent` header sent with every request
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Accept invalid TLS certificates
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Route every request through a proxy
    pub fn proxy(mut self, url: Url) -> Self {
        self.proxy = Some(ProxyConfig { url, matcher: None });
        self
    }

    /// Route requests whose host matches `pattern` through a proxy
    pub fn proxy_with_matcher(mut self, url: Url, pattern: &str) -> Result<Self, Error> {
        let matcher = regex::Regex::new(pattern)
            .map_err(|e| Error::Proxy(format!("Invalid proxy pattern: {}", e)))?;
        self.proxy = Some(ProxyConfig {
            url,
            matcher: Some(matcher),
        });
        Ok(self)
    }

    /// Build the transport
    pub fn build(self) -> Result<HttpTransport, Error> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if let Some(proxy_config) = self.proxy {
            let proxy_url = proxy_config.url.to_string();
            let proxy = if let Some(matcher) = proxy_config.matcher {
                reqwest::Proxy::custom(move |url| {
                    if matcher.is_match(url.host_str().unwrap_or("")) {
                        Some(proxy_url.clone())
                    } else {
                        None
                    }
                })
            } else {
                reqwest::Proxy::all(&proxy_url).map_err(|e| Error::Proxy(e.to_string()))?
            };
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| Error::Build(e.to_string()))?;
        Ok(HttpTransport { inner: client })
    }
}
