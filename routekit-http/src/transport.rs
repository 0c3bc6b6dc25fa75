//! Request transport.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::request::{ContentType, RequestConfig};
use crate::response::RawResponse;
use crate::{Error, HttpConfig, Result};

/// Sends formatted requests.
///
/// Routes hand every non-mocked call to a transport. Implement it to plug in
/// another client or to record requests in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response.
    async fn send(&self, request: RequestConfig) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: RequestConfig) -> Result<RawResponse> {
        (**self).send(request).await
    }
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    config: Arc<HttpConfig>,
}

impl ReqwestTransport {
    /// Build a transport from the HTTP configuration.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);

        if config.gzip {
            builder = builder.gzip(true);
        }
        if config.brotli {
            builder = builder.brotli(true);
        }
        if config.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        } else {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }

        let inner = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn build(&self, request: RequestConfig) -> Result<reqwest::RequestBuilder> {
        let url = resolve_url(self.config.base_url.as_deref(), &request.url)?;
        let method = request.effective_method();

        let mut builder = self.inner.request(method, url);

        for (name, value) in &self.config.default_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = builder.headers(request.headers);

        if !request.params.is_empty() {
            builder = builder.query(&query_pairs(&request.params));
        }

        if let Some(form) = request.form {
            builder = builder.multipart(form.into_multipart()?);
        } else if let Some(data) = request.data {
            builder = match request.content_type {
                ContentType::UrlEncoded => {
                    let body = serde_urlencoded::to_string(query_pairs(&object(&data)?))
                        .map_err(|e| Error::RequestBuild(e.to_string()))?;
                    builder
                        .header(http::header::CONTENT_TYPE, ContentType::UrlEncoded.as_str())
                        .body(body)
                }
                ContentType::Json | ContentType::FormData => builder.json(&data),
            };
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestConfig) -> Result<RawResponse> {
        let method = request.effective_method();
        let timeout = request.timeout.unwrap_or(self.config.timeout);
        let builder = self.build(request.clone())?;

        debug!(method = %method, url = %request.url, "Sending request");
        let response = builder.send().await.map_err(|e| timeout_error(e, timeout))?;
        let response = RawResponse::from_reqwest(response, request).await?;
        debug!(status = %response.status(), "Received response");

        response.error_for_status()
    }
}

fn timeout_error(error: reqwest::Error, timeout: Duration) -> Error {
    if error.is_timeout() {
        Error::Timeout(timeout)
    } else {
        error.into()
    }
}

/// Join a request URL onto the base URL.
///
/// Absolute request URLs are used as-is. Otherwise the two are joined with
/// exactly one slash, keeping any path on the base.
pub(crate) fn resolve_url(base: Option<&str>, url: &str) -> Result<url::Url> {
    if let Ok(absolute) = url::Url::parse(url) {
        return Ok(absolute);
    }
    let Some(base) = base else {
        return Err(Error::InvalidUrl(format!(
            "relative URL {url:?} without a base URL"
        )));
    };
    let joined = if url.is_empty() {
        base.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    };
    Ok(url::Url::parse(&joined)?)
}

/// Flatten parameters into query pairs. Arrays repeat the key, `null` is
/// skipped and nested objects are sent as JSON text.
pub(crate) fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|item| !item.is_null()) {
                    pairs.push((key.clone(), scalar_text(item)));
                }
            }
            other => pairs.push((key.clone(), scalar_text(other))),
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn object(data: &Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map.clone()),
        other => Err(Error::RequestBuild(format!(
            "url-encoded payload must be an object, got {other}"
        ))),
    }
}
