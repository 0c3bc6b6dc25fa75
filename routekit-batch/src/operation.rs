//! Type-erased asynchronous operations.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A shareable asynchronous operation `P -> Result<T, E>`.
///
/// The returned future is `'static` so it can be driven independently of the
/// caller that started it.
pub type Operation<P, T, E> = Arc<dyn Fn(P) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Erase a closure returning a future into an [`Operation`].
pub fn operation<P, T, E, F, Fut>(f: F) -> Operation<P, T, E>
where
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Arc::new(move |params| Box::pin(f(params)))
}
