//! # Routekit HTTP
//!
//! Typed HTTP routes on top of `reqwest`, with shared header stores, mocks,
//! response validation and optional deduplication of concurrent calls.
//!
//! ## Features
//!
//! - **Routes**: turn a typed input into a request and a typed response
//! - **Controllers**: group routes under a URL prefix with shared defaults
//! - **Header stores**: custom and auth headers read at call time
//! - **Batching**: concurrent calls to a batched route share one request
//! - **Mocks**: static or computed responses with an optional delay
//! - **Validation**: reject mapped responses before they reach callers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use routekit_http::{ControllerOptions, Http, HttpConfig, RequestConfig, RouteOptions};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Order {
//!     item: String,
//!     quantity: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = Http::new(HttpConfig::builder().base_url("https://api.example.com").build())?;
//!     http.auth_headers().bearer("secret")?;
//!
//!     let orders = http.controller("/orders", ControllerOptions::new());
//!     let create = orders
//!         .create_route::<Order, Order>(RequestConfig::post(""))
//!         .build();
//!     let list = orders
//!         .create_route::<(), Vec<Order>>(RequestConfig::get("/"))
//!         .options(RouteOptions::new().batch_concurrent_requests(true))
//!         .build();
//!
//!     create
//!         .call(Order { item: "widget".into(), quantity: 5 })
//!         .await?;
//!     let (first, second) = tokio::join!(list.call(()), list.call(()));
//!     assert_eq!(first?.len(), second?.len());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod controller;
mod error;
mod form_data;
mod headers;
mod mock;
mod request;
mod response;
mod route;
mod transport;
mod validation;

#[cfg(test)]
mod testing;

pub use client::Http;
pub use config::{ENV_PREFIX, HttpConfig, HttpConfigBuilder};
pub use controller::{Controller, ControllerOptions};
pub use error::{Error, Result};
pub use form_data::{Blob, FormData, FormValue};
pub use headers::HeaderStore;
pub use mock::{MockConfig, MockResponse};
pub use request::{ContentType, RequestConfig};
pub use response::RawResponse;
pub use route::{MapRawResponse, RequestHandler, Route, RouteFx, RouteOptions};
pub use transport::{ReqwestTransport, Transport};
pub use validation::{
    FnValidator, SchemaValidator, Validate, ValidationError, ValidationErrors, Validator,
};

pub use routekit_batch::EffectStats;

// Re-export common types
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use bytes::Bytes;

/// Prelude for common imports.
///
/// ```
/// use routekit_http::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{HttpConfig, HttpConfigBuilder};
    pub use crate::controller::{Controller, ControllerOptions};
    pub use crate::error::{Error, Result};
    pub use crate::form_data::{Blob, FormData};
    pub use crate::headers::HeaderStore;
    pub use crate::client::Http;
    pub use crate::mock::MockConfig;
    pub use crate::request::{ContentType, RequestConfig};
    pub use crate::response::RawResponse;
    pub use crate::route::{RequestHandler, RouteFx, RouteOptions};
    pub use crate::transport::Transport;
    pub use crate::validation::{FnValidator, SchemaValidator, Validate, Validator};
    pub use http::{HeaderMap, Method, StatusCode, header};
}
