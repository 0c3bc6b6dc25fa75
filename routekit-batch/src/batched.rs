//! Batched operation: one underlying call per in-flight window.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::operation::{Operation, operation};

/// Deduplicates concurrent calls to an asynchronous operation.
///
/// A window opens when a call arrives while nothing is in flight. Only the
/// opener's parameters reach the operation; every call made before the
/// operation settles subscribes to the same outcome. When the operation
/// settles the in-flight flag is cleared first, then the outcome is sent to
/// every subscriber in registration order and the subscriber list is emptied.
///
/// The outcome is cloned once per subscriber. Use `Arc` payloads when callers
/// must observe the same allocation.
///
/// Clones share the same window state.
pub struct Batched<P, T, E> {
    operation: Operation<P, T, E>,
    window: Arc<Mutex<Window<T, E>>>,
}

struct Window<T, E> {
    in_flight: bool,
    subscribers: Vec<oneshot::Sender<Result<T, E>>>,
    opened: u64,
}

impl<P, T, E> Batched<P, T, E>
where
    P: Send + 'static,
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Wrap a closure returning a future.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::from_operation(operation(f))
    }

    /// Wrap an already type-erased operation.
    pub fn from_operation(operation: Operation<P, T, E>) -> Self {
        Self {
            operation,
            window: Arc::new(Mutex::new(Window {
                in_flight: false,
                subscribers: Vec::new(),
                opened: 0,
            })),
        }
    }

    /// Call the operation, or join the window that is already in flight.
    ///
    /// Registration happens immediately, not on first poll, so the order in
    /// which `call` is invoked is the order in which outcomes are delivered.
    /// The underlying operation runs on a spawned task and keeps running even
    /// if every returned future is dropped.
    ///
    /// # Panics
    ///
    /// Panics when invoked outside a Tokio runtime. The returned future panics
    /// if the underlying operation panicked before settling.
    pub fn call(
        &self,
        params: P,
    ) -> impl Future<Output = Result<T, E>> + Send + use<P, T, E> {
        let (tx, rx) = oneshot::channel();

        let opens_window = {
            let mut window = self.window.lock();
            let opens = !window.in_flight;
            if opens {
                window.in_flight = true;
                window.opened += 1;
            }
            window.subscribers.push(tx);
            if !opens {
                trace!(
                    subscribers = window.subscribers.len(),
                    "Joined in-flight window"
                );
            }
            opens
        };

        if opens_window {
            // Created before the operation runs so a panicking closure still
            // releases the window.
            let guard = WindowGuard {
                window: Arc::clone(&self.window),
                settled: false,
            };
            let pending = (self.operation)(params);
            tokio::spawn(async move {
                let outcome = pending.await;
                guard.publish(outcome);
            });
        }

        async move {
            match rx.await {
                Ok(outcome) => outcome,
                Err(_) => panic!("batched operation did not settle"),
            }
        }
    }

    /// Whether an underlying call is currently outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.window.lock().in_flight
    }

    /// Number of callers waiting on the current window.
    pub fn subscriber_count(&self) -> usize {
        self.window.lock().subscribers.len()
    }

    /// Number of windows opened so far, i.e. underlying calls started.
    pub fn windows_opened(&self) -> u64 {
        self.window.lock().opened
    }
}

impl<P, T, E> Clone for Batched<P, T, E> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
            window: Arc::clone(&self.window),
        }
    }
}

impl<P, T, E> std::fmt::Debug for Batched<P, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let window = self.window.lock();
        f.debug_struct("Batched")
            .field("in_flight", &window.in_flight)
            .field("subscribers", &window.subscribers.len())
            .field("opened", &window.opened)
            .finish()
    }
}

/// Closes a window exactly once, on publish or on drop.
struct WindowGuard<T, E> {
    window: Arc<Mutex<Window<T, E>>>,
    settled: bool,
}

impl<T: Clone, E: Clone> WindowGuard<T, E> {
    fn publish(mut self, outcome: Result<T, E>) {
        let subscribers = {
            let mut window = self.window.lock();
            window.in_flight = false;
            std::mem::take(&mut window.subscribers)
        };
        self.settled = true;

        debug!(
            subscribers = subscribers.len(),
            ok = outcome.is_ok(),
            "Batched window settled"
        );

        for subscriber in subscribers {
            // A subscriber that dropped its future is simply skipped.
            let _ = subscriber.send(outcome.clone());
        }
    }
}

impl<T, E> Drop for WindowGuard<T, E> {
    fn drop(&mut self) {
        if !self.settled {
            let mut window = self.window.lock();
            window.in_flight = false;
            let abandoned = std::mem::take(&mut window.subscribers);
            warn!(
                subscribers = abandoned.len(),
                "Batched operation aborted before settling"
            );
        }
    }
}
