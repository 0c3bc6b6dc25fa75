//! Request configuration.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

use crate::form_data::FormData;

/// How `data` is encoded in the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentType {
    /// `application/json`
    #[default]
    Json,
    /// `multipart/form-data`
    FormData,
    /// `application/x-www-form-urlencoded`
    UrlEncoded,
}

impl ContentType {
    /// MIME string for the content type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormData => "multipart/form-data",
            Self::UrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

/// Description of a single HTTP request produced by a route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    /// HTTP method. `None` means GET.
    pub method: Option<Method>,
    /// Request URL, relative to the base URL when one is configured.
    pub url: String,
    /// Route-level headers.
    pub headers: HeaderMap,
    /// Query parameters.
    pub params: Map<String, Value>,
    /// Payload.
    pub data: Option<Value>,
    /// Payload encoding.
    pub content_type: ContentType,
    /// Explicit multipart payload.
    pub form: Option<FormData>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a request for a URL with no method set.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::GET)
    }

    /// Create a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::POST)
    }

    /// Create a PUT request.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::PUT)
    }

    /// Create a PATCH request.
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::PATCH)
    }

    /// Create a DELETE request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(url).with_method(Method::DELETE)
    }

    /// Set the method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the method by name. Names are case-insensitive.
    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        let name = method.as_ref().to_ascii_uppercase();
        match Method::from_bytes(name.as_bytes()) {
            Ok(method) => self.method = Some(method),
            Err(_) => warn!(method = %name, "Ignoring invalid HTTP method"),
        }
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => warn!(header = name.as_ref(), "Ignoring invalid header"),
        }
        self
    }

    /// Add multiple headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Add a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the payload from a serializable value.
    ///
    /// Values that fail to serialize are logged and leave the payload unset.
    pub fn data<T: Serialize>(mut self, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => self.data = Some(value),
            Err(e) => warn!(error = %e, "Failed to serialize request data"),
        }
        self
    }

    /// Set the payload encoding.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Send the payload as `multipart/form-data`.
    pub fn form_data(self) -> Self {
        self.content_type(ContentType::FormData)
    }

    /// Send an explicit multipart payload.
    pub fn form(mut self, form: FormData) -> Self {
        self.form = Some(form);
        self.content_type = ContentType::FormData;
        self
    }

    /// Set a custom timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Effective method.
    pub fn effective_method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }

    /// Normalize the request before it is sent.
    ///
    /// A missing method becomes GET. GET requests move object payloads into
    /// the query parameters; other methods convert object payloads to
    /// multipart entries when the content type asks for form data.
    pub fn format(mut self) -> Self {
        let method = self.effective_method();
        self.method = Some(method.clone());

        if method == Method::GET {
            if let Some(Value::Object(data)) = &self.data {
                if !self.params.is_empty() {
                    warn!(
                        url = %self.url,
                        "Both params and data set on a GET request, params can be overridden"
                    );
                }
                let data = data.clone();
                self.params.extend(data);
                self.data = None;
            }
        } else if self.content_type == ContentType::FormData
            && let Some(data @ Value::Object(_)) = &self.data
        {
            let converted = FormData::from_value(data);
            let form = match self.form.take() {
                Some(mut form) => {
                    form.extend(converted);
                    form
                }
                None => converted,
            };
            self.form = Some(form);
            self.data = None;
        }

        self
    }
}
