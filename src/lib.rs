// Routekit - typed HTTP routes with in-flight request deduplication
//
// This library bundles the deduplication primitives of `routekit-batch` with
// the route layer of `routekit-http`.

// Re-export the batching primitives
pub use routekit_batch::*;

// Re-export the route layer
#[cfg(feature = "http")]
pub use routekit_http;

#[cfg(feature = "http")]
pub use routekit_http::{
    Controller, ControllerOptions, Error, FormData, HeaderStore, Http, HttpConfig, MockConfig,
    RawResponse, RequestConfig, RequestHandler, Result, RouteFx, RouteOptions,
};

// Prelude for common imports
pub mod prelude {
    pub use routekit_batch::prelude::*;

    #[cfg(feature = "http")]
    pub use routekit_http::prelude::*;
}
