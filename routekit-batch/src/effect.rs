//! Effects: an operation called either directly or through a batched window.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::batched::Batched;
use crate::operation::{Operation, operation};

/// Call counters for an [`Effect`].
///
/// `calls` counts every invocation, `done` and `failed` count the outcomes
/// delivered to callers. Three callers sharing one batched window that
/// succeeds therefore record three calls and three done.
#[derive(Debug, Default)]
pub struct EffectStats {
    calls: AtomicU64,
    done: AtomicU64,
    failed: AtomicU64,
}

impl EffectStats {
    /// Number of times the effect was called.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of successful outcomes delivered.
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Number of failed outcomes delivered.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn record<T, E>(&self, outcome: &Result<T, E>) {
        let counter = if outcome.is_ok() {
            &self.done
        } else {
            &self.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

enum Mode<P, T, E> {
    Direct(Operation<P, T, E>),
    Batched(Batched<P, T, E>),
}

/// An asynchronous operation with an execution mode.
///
/// Direct effects run the operation on every call. Batched effects route calls
/// through a [`Batched`] window so concurrent callers share one execution.
pub struct Effect<P, T, E> {
    mode: Mode<P, T, E>,
    stats: Arc<EffectStats>,
}

impl<P, T, E> Effect<P, T, E>
where
    P: Send + 'static,
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Effect that runs the operation on every call.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::from_operation(operation(f), false)
    }

    /// Effect that deduplicates concurrent calls.
    pub fn batched<F, Fut>(f: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::from_operation(operation(f), true)
    }

    /// Build an effect from a type-erased operation.
    pub fn from_operation(operation: Operation<P, T, E>, batched: bool) -> Self {
        let mode = if batched {
            Mode::Batched(Batched::from_operation(operation))
        } else {
            Mode::Direct(operation)
        };
        Self {
            mode,
            stats: Arc::new(EffectStats::default()),
        }
    }

    /// Call the effect.
    ///
    /// # Panics
    ///
    /// Batched effects must be called inside a Tokio runtime.
    pub fn call(
        &self,
        params: P,
    ) -> impl Future<Output = Result<T, E>> + Send + use<P, T, E> {
        self.stats.calls.fetch_add(1, Ordering::Relaxed);
        let stats = Arc::clone(&self.stats);
        let pending: futures::future::BoxFuture<'static, Result<T, E>> = match &self.mode {
            Mode::Direct(operation) => operation(params),
            Mode::Batched(batched) => Box::pin(batched.call(params)),
        };

        async move {
            let outcome = pending.await;
            stats.record(&outcome);
            outcome
        }
    }

    /// Whether calls are deduplicated.
    pub fn is_batched(&self) -> bool {
        matches!(self.mode, Mode::Batched(_))
    }

    /// The batched window, if this effect is batched.
    pub fn batched_window(&self) -> Option<&Batched<P, T, E>> {
        match &self.mode {
            Mode::Batched(batched) => Some(batched),
            Mode::Direct(_) => None,
        }
    }

    /// Call counters.
    pub fn stats(&self) -> &EffectStats {
        &self.stats
    }
}

impl<P, T, E> Clone for Effect<P, T, E> {
    fn clone(&self) -> Self {
        let mode = match &self.mode {
            Mode::Direct(operation) => Mode::Direct(Arc::clone(operation)),
            Mode::Batched(batched) => Mode::Batched(batched.clone()),
        };
        Self {
            mode,
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<P, T, E> std::fmt::Debug for Effect<P, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("batched", &matches!(self.mode, Mode::Batched(_)))
            .field("stats", &self.stats)
            .finish()
    }
}
