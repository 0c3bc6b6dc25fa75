//! Mocked route responses.

use routekit_batch::Effect;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use crate::Error;

/// What a mocked route answers with.
pub enum MockResponse<Dto, Contract> {
    /// The same value for every call.
    Static(Contract),
    /// A value computed from the call's input.
    Handler(Arc<dyn Fn(&Dto) -> Contract + Send + Sync>),
}

impl<Dto, Contract: Clone> Clone for MockResponse<Dto, Contract> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(value) => Self::Static(value.clone()),
            Self::Handler(handler) => Self::Handler(Arc::clone(handler)),
        }
    }
}

impl<Dto, Contract: fmt::Debug> fmt::Debug for MockResponse<Dto, Contract> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// Mock configuration for a route.
///
/// A mocked route never reaches the transport and skips validation.
#[derive(Debug)]
pub struct MockConfig<Dto, Contract> {
    /// Response source.
    pub response: MockResponse<Dto, Contract>,
    /// Time to wait before answering.
    pub delay: Option<Duration>,
    /// Deduplicate concurrent calls.
    pub batch: bool,
}

impl<Dto, Contract: Clone> Clone for MockConfig<Dto, Contract> {
    fn clone(&self) -> Self {
        Self {
            response: self.response.clone(),
            delay: self.delay,
            batch: self.batch,
        }
    }
}

impl<Dto, Contract> MockConfig<Dto, Contract> {
    /// Mock answering every call with `response`.
    pub fn response(response: Contract) -> Self {
        Self {
            response: MockResponse::Static(response),
            delay: None,
            batch: false,
        }
    }

    /// Mock computing its answer from the input.
    pub fn handler<F>(handler: F) -> Self
    where
        F: Fn(&Dto) -> Contract + Send + Sync + 'static,
    {
        Self {
            response: MockResponse::Handler(Arc::new(handler)),
            delay: None,
            batch: false,
        }
    }

    /// Wait before answering.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Deduplicate concurrent calls.
    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }
}

impl<Dto, Contract> MockConfig<Dto, Contract>
where
    Dto: Send + 'static,
    Contract: Clone + Send + Sync + 'static,
{
    pub(crate) fn into_effect(self) -> Effect<Dto, Contract, Error> {
        let Self {
            response,
            delay,
            batch,
        } = self;
        let response = Arc::new(response);

        let answer = move |dto: Dto| {
            let response = Arc::clone(&response);
            async move {
                if let Some(delay) = delay {
                    trace!(?delay, "Delaying mocked response");
                    tokio::time::sleep(delay).await;
                }
                Ok(match response.as_ref() {
                    MockResponse::Static(value) => value.clone(),
                    MockResponse::Handler(handler) => handler(&dto),
                })
            }
        };

        if batch {
            Effect::batched(answer)
        } else {
            Effect::new(answer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_static_response() {
        let fx = MockConfig::<(), String>::response("pong".to_string()).into_effect();

        assert_eq!(fx.call(()).await.unwrap(), "pong");
        assert!(!fx.is_batched());
    }

    #[tokio::test]
    async fn test_handler_uses_input() {
        let fx = MockConfig::handler(|id: &u32| format!("user-{id}")).into_effect();

        assert_eq!(fx.call(4).await.unwrap(), "user-4");
        assert_eq!(fx.call(9).await.unwrap(), "user-9");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_applied() {
        let fx = MockConfig::<(), u8>::response(1)
            .delay(Duration::from_millis(1000))
            .into_effect();

        let started = Instant::now();
        fx.call(()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batched_mock_runs_handler_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let fx = MockConfig::handler(move |_: &()| counter.fetch_add(1, Ordering::SeqCst) + 1)
            .delay(Duration::from_millis(1000))
            .batch(true)
            .into_effect();

        let (a, b, c) = tokio::join!(fx.call(()), fx.call(()), fx.call(()));

        assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (1, 1, 1));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(fx.stats().done(), 3);
    }
}
