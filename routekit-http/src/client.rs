//! HTTP entry point and shared route context.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::controller::{Controller, ControllerOptions};
use crate::headers::{self, HeaderStore};
use crate::request::RequestConfig;
use crate::response::RawResponse;
use crate::route::{RequestHandler, Route};
use crate::transport::{ReqwestTransport, Transport};
use crate::{HttpConfig, Result};

/// State shared by every route created from one [`Http`].
pub(crate) struct HttpContext {
    pub(crate) config: HttpConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) headers: HeaderStore,
    pub(crate) auth_headers: HeaderStore,
}

impl HttpContext {
    /// Apply the header stores to a request and format it.
    ///
    /// Route headers are the base layer. Custom headers override them and
    /// auth headers override both.
    pub(crate) fn prepare(&self, mut request: RequestConfig, with_auth: bool) -> RequestConfig {
        let custom = self.headers.snapshot();
        let auth = if with_auth {
            self.auth_headers.snapshot()
        } else {
            Default::default()
        };
        request.headers = headers::merge([&request.headers, &custom, &auth]);
        request.format()
    }

    pub(crate) async fn send(&self, request: RequestConfig) -> Result<RawResponse> {
        self.transport.send(request).await
    }
}

/// Entry point creating routes and controllers over one transport.
///
/// ```rust,no_run
/// use routekit_http::{Http, HttpConfig, RequestConfig, RequestHandler};
/// use serde::Deserialize;
///
/// #[derive(Debug, Clone, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn run() -> routekit_http::Result<()> {
/// let http = Http::new(HttpConfig::builder().base_url("https://api.example.com").build())?;
/// http.auth_headers().bearer("secret")?;
///
/// let get_user = http
///     .create_route::<u64, User>(RequestHandler::dynamic(|id: &u64| {
///         RequestConfig::get(format!("/users/{id}"))
///     }))
///     .build();
///
/// let user = get_user.call(7).await?;
/// println!("{}", user.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Http {
    context: Arc<HttpContext>,
}

impl Http {
    /// Create an entry point backed by a `reqwest` transport.
    pub fn new(config: HttpConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.clone())?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create an entry point configured from `ROUTEKIT_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::new(HttpConfig::from_env()?)
    }

    /// Create an entry point with a custom transport.
    pub fn with_transport(config: HttpConfig, transport: impl Transport + 'static) -> Self {
        debug!(
            base_url = ?config.base_url,
            enable_mocks = config.enable_mocks,
            "Creating HTTP entry point"
        );
        Self {
            context: Arc::new(HttpContext {
                config,
                transport: Arc::new(transport),
                headers: HeaderStore::new(),
                auth_headers: HeaderStore::new(),
            }),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &HttpConfig {
        &self.context.config
    }

    /// Custom headers sent with every route call.
    pub fn headers(&self) -> &HeaderStore {
        &self.context.headers
    }

    /// Auth headers sent with every route call unless the route disables auth.
    pub fn auth_headers(&self) -> &HeaderStore {
        &self.context.auth_headers
    }

    /// Start building a route.
    pub fn create_route<Dto, Contract>(
        &self,
        handler: impl Into<RequestHandler<Dto>>,
    ) -> Route<Dto, Contract> {
        Route::new(
            Arc::clone(&self.context),
            handler.into(),
            String::new(),
            ControllerOptions::default(),
        )
    }

    /// Create a controller whose routes share a URL prefix and defaults.
    pub fn controller(&self, prefix: impl Into<String>, options: ControllerOptions) -> Controller {
        Controller::new(Arc::clone(&self.context), prefix.into(), options)
    }

    /// Send a single request with the header stores applied.
    pub async fn send(&self, request: RequestConfig) -> Result<RawResponse> {
        let request = self.context.prepare(request, true);
        self.context.send(request).await
    }
}

impl fmt::Debug for Http {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Http")
            .field("config", &self.context.config)
            .field("headers", &self.context.headers)
            .field("auth_headers", &self.context.auth_headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use http::Method;

    #[tokio::test]
    async fn test_send_applies_header_stores() {
        let transport = RecordingTransport::new();
        let http = Http::with_transport(HttpConfig::default(), transport.clone());
        http.headers().insert("X-Custom", "store").unwrap();
        http.headers().insert("X-Shared", "store").unwrap();
        http.auth_headers().bearer("t").unwrap();

        http.send(RequestConfig::new("/ping").header("X-Shared", "route"))
            .await
            .unwrap();

        let sent = transport.last().unwrap();
        assert_eq!(sent.method, Some(Method::GET));
        assert_eq!(sent.headers.get("x-custom").unwrap(), "store");
        assert_eq!(sent.headers.get("x-shared").unwrap(), "store");
        assert_eq!(sent.headers.get("authorization").unwrap(), "Bearer t");
    }

    #[test]
    fn test_auth_store_overrides_route_headers() {
        let http = Http::with_transport(HttpConfig::default(), RecordingTransport::new());
        http.headers().insert("X-Trace", "custom").unwrap();
        http.auth_headers().insert("X-Trace", "auth").unwrap();
        http.auth_headers().bearer("store").unwrap();

        let route = RequestConfig::new("/")
            .header("Authorization", "Bearer route")
            .header("X-Route", "kept");
        let request = http.context.prepare(route, true);

        assert_eq!(request.headers.get("authorization").unwrap(), "Bearer store");
        assert_eq!(request.headers.get("x-trace").unwrap(), "auth");
        assert_eq!(request.headers.get("x-route").unwrap(), "kept");
    }

    #[test]
    fn test_prepare_without_auth() {
        let http = Http::with_transport(HttpConfig::default(), RecordingTransport::new());
        http.auth_headers().bearer("t").unwrap();

        let request = http.context.prepare(RequestConfig::new("/"), false);
        assert!(request.headers.get("authorization").is_none());
    }

    #[test]
    fn test_new_builds_reqwest_transport() {
        let http = Http::new(HttpConfig::builder().enable_mocks(false).build()).unwrap();
        assert!(!http.config().enable_mocks);
    }
}
