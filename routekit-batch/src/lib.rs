//! # Routekit Batch
//!
//! In-flight call deduplication for asynchronous operations.
//!
//! A [`Batched`] wrapper lets the first caller start the underlying operation
//! while every caller that arrives before it settles waits for, and receives,
//! the very same outcome. Once the outcome is published the next call starts a
//! fresh window.
//!
//! ## Features
//!
//! - **Single flight**: at most one underlying call per wrapper at any time
//! - **Shared outcome**: success and failure are broadcast to every waiter
//! - **Ordered delivery**: waiters are notified in the order they called
//! - **Nesting**: wrappers compose, each one keeping its own window
//! - **Effects**: [`Effect`] switches between direct and batched execution
//!
//! ## Quick Start
//!
//! ```rust
//! use routekit_batch::Batched;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[tokio::main]
//! async fn main() {
//!     let hits = Arc::new(AtomicUsize::new(0));
//!     let counter = Arc::clone(&hits);
//!
//!     let fetch_user = Batched::new(move |id: u32| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         async move { Ok::<_, String>(format!("user-{id}")) }
//!     });
//!
//!     let (a, b) = tokio::join!(fetch_user.call(1), fetch_user.call(2));
//!
//!     // Only the window-opening call reached the operation.
//!     assert_eq!(a, Ok("user-1".to_string()));
//!     assert_eq!(b, Ok("user-1".to_string()));
//!     assert_eq!(hits.load(Ordering::SeqCst), 1);
//! }
//! ```

mod batched;
mod effect;
mod operation;

pub use batched::Batched;
pub use effect::{Effect, EffectStats};
pub use operation::{Operation, operation};

/// Prelude for common imports.
///
/// ```
/// use routekit_batch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::batched::Batched;
    pub use crate::effect::{Effect, EffectStats};
    pub use crate::operation::{Operation, operation};
}
