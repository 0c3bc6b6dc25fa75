//! Typed routes.
//!
//! A [`Route`] turns a call input (`Dto`) into a request, sends it through the
//! transport and maps the response to the route's `Contract`. Building a route
//! yields a [`RouteFx`], the callable effect.

use routekit_batch::{Effect, EffectStats};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::controller::ControllerOptions;
use crate::client::HttpContext;
use crate::mock::MockConfig;
use crate::request::RequestConfig;
use crate::response::RawResponse;
use crate::validation::Validator;
use crate::{Error, Result};

/// Produces the request for a call.
pub enum RequestHandler<Dto> {
    /// Fixed request. The call input is sent as its payload.
    Static(RequestConfig),
    /// Request computed from the call input.
    Dynamic(Arc<dyn Fn(&Dto) -> RequestConfig + Send + Sync>),
}

impl<Dto> RequestHandler<Dto> {
    /// Handler computing the request from the call input.
    pub fn dynamic<F>(handler: F) -> Self
    where
        F: Fn(&Dto) -> RequestConfig + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(handler))
    }
}

impl<Dto: Serialize> RequestHandler<Dto> {
    fn normalize(&self, dto: &Dto, force_trim_payload: bool) -> Result<RequestConfig> {
        match self {
            Self::Dynamic(handler) => Ok(handler(dto)),
            Self::Static(config) if force_trim_payload => Ok(config.clone()),
            Self::Static(config) => {
                let mut config = config.clone();
                config.data = match serde_json::to_value(dto)? {
                    Value::Null => None,
                    value => Some(value),
                };
                Ok(config)
            }
        }
    }
}

impl<Dto> From<RequestConfig> for RequestHandler<Dto> {
    fn from(config: RequestConfig) -> Self {
        Self::Static(config)
    }
}

impl<Dto> Clone for RequestHandler<Dto> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(config) => Self::Static(config.clone()),
            Self::Dynamic(handler) => Self::Dynamic(Arc::clone(handler)),
        }
    }
}

impl<Dto> fmt::Debug for RequestHandler<Dto> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(config) => f.debug_tuple("Static").field(config).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Maps a raw response to the route contract.
pub type MapRawResponse<Contract> = Arc<dyn Fn(RawResponse) -> Result<Contract> + Send + Sync>;

/// Per-route options.
///
/// `disable_auth` and `batch_concurrent_requests` fall back to the controller
/// defaults when unset.
pub struct RouteOptions<Contract> {
    /// Custom response mapping. Defaults to decoding the body as JSON.
    pub map_raw_response: Option<MapRawResponse<Contract>>,
    /// Do not send the call input as the payload of a static request.
    pub force_trim_payload: bool,
    /// Deduplicate concurrent calls.
    pub batch_concurrent_requests: Option<bool>,
    /// Skip the auth header store.
    pub disable_auth: Option<bool>,
}

impl<Contract> RouteOptions<Contract> {
    /// Options with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map the raw response with a custom function.
    pub fn map_raw_response<F>(mut self, map: F) -> Self
    where
        F: Fn(RawResponse) -> Result<Contract> + Send + Sync + 'static,
    {
        self.map_raw_response = Some(Arc::new(map));
        self
    }

    /// Do not send the call input as payload.
    pub fn force_trim_payload(mut self, trim: bool) -> Self {
        self.force_trim_payload = trim;
        self
    }

    /// Deduplicate concurrent calls.
    pub fn batch_concurrent_requests(mut self, batch: bool) -> Self {
        self.batch_concurrent_requests = Some(batch);
        self
    }

    /// Skip the auth header store.
    pub fn disable_auth(mut self, disable: bool) -> Self {
        self.disable_auth = Some(disable);
        self
    }

    /// Fields set on `other` replace the ones set here.
    fn merge(self, other: Self) -> Self {
        Self {
            map_raw_response: other.map_raw_response.or(self.map_raw_response),
            force_trim_payload: other.force_trim_payload || self.force_trim_payload,
            batch_concurrent_requests: other
                .batch_concurrent_requests
                .or(self.batch_concurrent_requests),
            disable_auth: other.disable_auth.or(self.disable_auth),
        }
    }
}

impl<Contract> Default for RouteOptions<Contract> {
    fn default() -> Self {
        Self {
            map_raw_response: None,
            force_trim_payload: false,
            batch_concurrent_requests: None,
            disable_auth: None,
        }
    }
}

impl<Contract> Clone for RouteOptions<Contract> {
    fn clone(&self) -> Self {
        Self {
            map_raw_response: self.map_raw_response.clone(),
            force_trim_payload: self.force_trim_payload,
            batch_concurrent_requests: self.batch_concurrent_requests,
            disable_auth: self.disable_auth,
        }
    }
}

impl<Contract> fmt::Debug for RouteOptions<Contract> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("map_raw_response", &self.map_raw_response.is_some())
            .field("force_trim_payload", &self.force_trim_payload)
            .field("batch_concurrent_requests", &self.batch_concurrent_requests)
            .field("disable_auth", &self.disable_auth)
            .finish()
    }
}

/// Route builder. Create one with [`Http::create_route`](crate::Http::create_route)
/// or [`Controller::create_route`](crate::Controller::create_route).
pub struct Route<Dto, Contract> {
    context: Arc<HttpContext>,
    handler: RequestHandler<Dto>,
    prefix: String,
    defaults: ControllerOptions,
    options: RouteOptions<Contract>,
    mock: Option<MockConfig<Dto, Contract>>,
    validator: Option<Arc<dyn Validator<Contract>>>,
}

impl<Dto, Contract> Route<Dto, Contract> {
    pub(crate) fn new(
        context: Arc<HttpContext>,
        handler: RequestHandler<Dto>,
        prefix: String,
        defaults: ControllerOptions,
    ) -> Self {
        Self {
            context,
            handler,
            prefix,
            defaults,
            options: RouteOptions::default(),
            mock: None,
            validator: None,
        }
    }

    /// Apply route options. Fields set here override earlier ones.
    pub fn options(mut self, options: RouteOptions<Contract>) -> Self {
        self.options = std::mem::take(&mut self.options).merge(options);
        self
    }

    /// Answer calls from a mock while mocks are enabled.
    pub fn mock(mut self, mock: MockConfig<Dto, Contract>) -> Self {
        self.mock = Some(mock);
        self
    }

    /// Validate every mapped response.
    pub fn validation(mut self, validator: impl Validator<Contract> + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }
}

impl<Dto, Contract> Route<Dto, Contract>
where
    Dto: Serialize + Send + 'static,
    Contract: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Build the callable effect.
    ///
    /// Responses are decoded as JSON unless a mapping was set in the options.
    pub fn build(mut self) -> RouteFx<Dto, Contract> {
        let map = self
            .options
            .map_raw_response
            .take()
            .unwrap_or_else(|| Arc::new(|response: RawResponse| response.json()));
        self.into_fx(map)
    }
}

impl<Dto, Contract> Route<Dto, Contract>
where
    Dto: Serialize + Send + 'static,
    Contract: Clone + Send + Sync + 'static,
{
    /// Build the callable effect with a mapping function.
    ///
    /// The contract does not need to be deserializable. `map` replaces any
    /// mapping set in the options.
    pub fn build_with_mapper<F>(self, map: F) -> RouteFx<Dto, Contract>
    where
        F: Fn(RawResponse) -> Result<Contract> + Send + Sync + 'static,
    {
        self.into_fx(Arc::new(map))
    }

    fn into_fx(self, map: MapRawResponse<Contract>) -> RouteFx<Dto, Contract> {
        let Self {
            context,
            handler,
            prefix,
            defaults,
            options,
            mock,
            validator,
        } = self;

        if let Some(mock) = mock.filter(|_| context.config.enable_mocks) {
            debug!(prefix = %prefix, batched = mock.batch, "Building mocked route");
            return RouteFx {
                effect: mock.into_effect(),
                mock: true,
            };
        }

        let batch = options
            .batch_concurrent_requests
            .unwrap_or(defaults.batch_concurrent_requests);
        let with_auth = !options.disable_auth.unwrap_or(defaults.disable_auth);
        let force_trim_payload = options.force_trim_payload;

        let run = move |dto: Dto| {
            let context = Arc::clone(&context);
            let map = Arc::clone(&map);
            let validator = validator.clone();
            let request = handler.normalize(&dto, force_trim_payload).map(|mut request| {
                request.url = format!("{}{}", prefix, request.url);
                context.prepare(request, with_auth)
            });

            async move {
                let request = request?;
                trace!(url = %request.url, "Calling route");
                let response = context.send(request).await?;
                let contract = map(response)?;
                if let Some(validator) = validator {
                    validator.validate(&contract).await?;
                }
                Ok(contract)
            }
        };

        let effect = if batch {
            Effect::batched(run)
        } else {
            Effect::new(run)
        };
        RouteFx {
            effect,
            mock: false,
        }
    }
}

/// Callable route effect.
pub struct RouteFx<Dto, Contract> {
    effect: Effect<Dto, Contract, Error>,
    mock: bool,
}

impl<Dto, Contract> RouteFx<Dto, Contract>
where
    Dto: Send + 'static,
    Contract: Clone + Send + 'static,
{
    /// Call the route.
    pub fn call(
        &self,
        dto: Dto,
    ) -> impl Future<Output = Result<Contract>> + Send + use<Dto, Contract> {
        self.effect.call(dto)
    }

    /// Whether concurrent calls share one request.
    pub fn is_batched(&self) -> bool {
        self.effect.is_batched()
    }

    /// Whether calls are answered by a mock.
    pub fn is_mock(&self) -> bool {
        self.mock
    }

    /// Call counters.
    pub fn stats(&self) -> &EffectStats {
        self.effect.stats()
    }
}

impl<Dto, Contract> Clone for RouteFx<Dto, Contract> {
    fn clone(&self) -> Self {
        Self {
            effect: self.effect.clone(),
            mock: self.mock,
        }
    }
}

impl<Dto, Contract> fmt::Debug for RouteFx<Dto, Contract> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteFx")
            .field("effect", &self.effect)
            .field("mock", &self.mock)
            .finish()
    }
}
