//! Raw HTTP response.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;

use crate::request::RequestConfig;
use crate::{Error, Result};

/// Response as returned by a [`Transport`](crate::Transport), before the
/// route maps it to its contract type.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    request: RequestConfig,
}

impl RawResponse {
    /// Create a response for the request that produced it.
    pub fn new(status: StatusCode, body: impl Into<Bytes>, request: RequestConfig) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            request,
        }
    }

    /// 200 response with a JSON body.
    pub fn json_body<T: serde::Serialize>(value: &T, request: RequestConfig) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(StatusCode::OK, body, request).with_header(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
    }

    pub(crate) async fn from_reqwest(
        response: reqwest::Response,
        request: RequestConfig,
    ) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
            request,
        })
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// The request that produced this response, after formatting.
    pub fn request(&self) -> &RequestConfig {
        &self.request
    }

    /// Get the response body as bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Json(e.to_string()))
    }

    /// Parse the response body as JSON. An empty body parses as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Check for an error response and return it.
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_client_error() || self.status.is_server_error() {
            let message = self.text().unwrap_or_else(|_| "Unknown error".to_string());
            Err(Error::Response {
                status: self.status.as_u16(),
                message,
            })
        } else {
            Ok(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u32,
    }

    #[test]
    fn test_json_decoding() {
        let response = RawResponse::new(StatusCode::OK, r#"{"id":7}"#, RequestConfig::get("/u"));
        assert_eq!(response.json::<User>().unwrap(), User { id: 7 });
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let response = RawResponse::new(StatusCode::NO_CONTENT, Bytes::new(), RequestConfig::default());

        response.json::<()>().unwrap();
        assert_eq!(response.json::<Option<User>>().unwrap(), None);
    }

    #[test]
    fn test_error_for_status() {
        let response = RawResponse::new(
            StatusCode::BAD_REQUEST,
            "nope",
            RequestConfig::get("/u"),
        );

        let error = response.error_for_status().unwrap_err();
        assert_eq!(error.status_code(), Some(400));
        assert!(error.to_string().contains("nope"));
    }

    #[test]
    fn test_request_is_kept() {
        let request = RequestConfig::post("/users").header("X-Trace", "abc");
        let response = RawResponse::json_body(&serde_json::json!({"id": 1}), request).unwrap();

        assert_eq!(response.request().url, "/users");
        assert_eq!(response.header("content-type"), Some("application/json"));
    }
}
