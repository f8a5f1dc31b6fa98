//! API client

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Request};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::Url;

use crate::error::{ApiError, Error};
use crate::settings::{Settings, DEFAULT_BASE_URL};
use crate::transport::{HttpTransport, Transport};

/// Media type of request and response bodies
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Client for the 99 Taxis REST API
///
/// Paths passed to [`Client::request`] are resolved against the base URL, so
/// with a base of `https://api.99taxis.com/v1/` the path `rides` targets
/// `https://api.99taxis.com/v1/rides`.
///
/// A client is cheap to clone and safe to share between tasks as long as its
/// transport is.
#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport>
where
    T: Transport,
{
    base_url: Url,
    transport: T,
}

impl<T> Client<T>
where
    T: Transport + Default,
{
    /// Create new [`Client`] pointing at [`DEFAULT_BASE_URL`]
    ///
    /// `None` selects the default transport.
    ///
    /// # Panics
    ///
    /// Only if [`DEFAULT_BASE_URL`] is not a valid URL, which
    /// `test_client_new_default_base_url` rules out.
    pub fn new(transport: Option<T>) -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("Invalid default URL"),
            transport: transport.unwrap_or_default(),
        }
    }
}

impl Client<HttpTransport> {
    /// Create new [`Client`] from [`Settings`]
    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        Ok(Self::new(Some(settings.transport()?)).with_base_url(settings.base_url()?))
    }
}

impl<T> Client<T>
where
    T: Transport,
{
    /// Replace the base URL
    ///
    /// A trailing `/` is appended to the path if missing so that relative
    /// paths are appended to it instead of replacing its last segment.
    pub fn with_base_url(mut self, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        self.base_url = base_url;
        self
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve a relative path against the base URL
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        if path.starts_with("//") {
            return Err(Error::InvalidPath {
                path: path.to_string(),
                reason: "network-path references are not allowed".to_string(),
            });
        }

        let first_segment = path.split(['/', '?', '#']).next().unwrap_or_default();
        if first_segment.contains(':') {
            return Err(Error::InvalidPath {
                path: path.to_string(),
                reason: "first path segment cannot contain a colon".to_string(),
            });
        }

        Ok(self.base_url.join(path)?)
    }

    /// Send a request and optionally decode its JSON response
    ///
    /// `body`, when present, is sent as JSON with a `Content-Type` of
    /// [`JSON_CONTENT_TYPE`]. Without a body no `Content-Type` is set.
    ///
    /// When `out` is `Some` the response body is decoded into it. When `out`
    /// is `None` the response is dropped without its body being read.
    ///
    /// Invalid paths, methods or bodies fail before the transport is used.
    /// A cancelled `ctx` aborts the call with [`Error::Cancelled`], whether it
    /// was cancelled before the call or while the request was in flight.
    /// With `out` present, a non-success status or a body that does not
    /// decode fails with [`Error::Api`]. `out` is only written on success.
    pub async fn request<B, R>(
        &self,
        ctx: &CancellationToken,
        method: &str,
        path: &str,
        body: Option<&B>,
        out: Option<&mut R>,
    ) -> Result<(), Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let decoded = self
            .dispatch::<B, R>(ctx, method, path, body, out.is_some())
            .await?;

        if let (Some(out), Some(value)) = (out, decoded) {
            *out = value;
        }

        Ok(())
    }

    /// Send a request and decode its JSON response into a new value
    pub async fn request_json<B, R>(
        &self,
        ctx: &CancellationToken,
        method: &str,
        path: &str,
        body: Option<&B>,
    ) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.dispatch(ctx, method, path, body, true)
            .await?
            .ok_or_else(|| ApiError::new(None, "response body was not decoded").into())
    }

    /// Send a request, leaving its response body unread
    ///
    /// The response status is not checked.
    pub async fn send<B>(
        &self,
        ctx: &CancellationToken,
        method: &str,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), Error>
    where
        B: Serialize + ?Sized,
    {
        self.dispatch::<B, IgnoredAny>(ctx, method, path, body, false)
            .await
            .map(|_| ())
    }

    #[instrument(skip(self, ctx, body), fields(base_url = %self.base_url))]
    async fn dispatch<B, R>(
        &self,
        ctx: &CancellationToken,
        method: &str,
        path: &str,
        body: Option<&B>,
        decode: bool,
    ) -> Result<Option<R>, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_request(method, path, body)?;

        if ctx.is_cancelled() {
            tracing::debug!("Request cancelled before dispatch");
            return Err(Error::Cancelled);
        }

        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                tracing::debug!("Request cancelled in flight");
                Err(Error::Cancelled)
            }
            result = self.exchange(request, decode) => result,
        }
    }

    fn build_request<B>(&self, method: &str, path: &str, body: Option<&B>) -> Result<Request, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;

        let payload = body.map(serde_json::to_vec).transpose()?;

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| Error::InvalidMethod(method.to_string()))?;

        let mut request = Request::new(method, url);

        if let Some(payload) = payload {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
            *request.body_mut() = Some(payload.into());
        }

        Ok(request)
    }

    async fn exchange<R>(&self, request: Request, decode: bool) -> Result<Option<R>, Error>
    where
        R: DeserializeOwned,
    {
        tracing::debug!("Sending {} {}", request.method(), request.url());

        let response = self.transport.execute(request).await?;
        let status = response.status();

        tracing::debug!("Response status: {}", status);

        // Without an output slot the body is left unread whatever the status
        if !decode {
            return Ok(None);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::new(Some(status.as_u16()), message).into());
        }

        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map(Some).map_err(|err| {
            tracing::warn!("Http Response error: {}", err);
            ApiError::new(Some(status.as_u16()), err.to_string()).into()
        })
    }
}
