//! Route groups sharing a URL prefix.

use std::fmt;
use std::sync::Arc;

use crate::client::HttpContext;
use crate::route::{RequestHandler, Route};

/// Defaults applied to every route of a [`Controller`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Skip the auth header store.
    pub disable_auth: bool,
    /// Deduplicate concurrent calls.
    pub batch_concurrent_requests: bool,
}

impl ControllerOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the auth header store.
    pub fn disable_auth(mut self, disable: bool) -> Self {
        self.disable_auth = disable;
        self
    }

    /// Deduplicate concurrent calls.
    pub fn batch_concurrent_requests(mut self, batch: bool) -> Self {
        self.batch_concurrent_requests = batch;
        self
    }
}

/// Creates routes under a common URL prefix.
#[derive(Clone)]
pub struct Controller {
    context: Arc<HttpContext>,
    prefix: String,
    options: ControllerOptions,
}

impl Controller {
    pub(crate) fn new(context: Arc<HttpContext>, prefix: String, options: ControllerOptions) -> Self {
        Self {
            context,
            prefix,
            options,
        }
    }

    /// URL prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Route defaults.
    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    /// Start building a route whose URL is appended to the prefix.
    pub fn create_route<Dto, Contract>(
        &self,
        handler: impl Into<RequestHandler<Dto>>,
    ) -> Route<Dto, Contract> {
        Route::new(
            Arc::clone(&self.context),
            handler.into(),
            self.prefix.clone(),
            self.options,
        )
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("prefix", &self.prefix)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
