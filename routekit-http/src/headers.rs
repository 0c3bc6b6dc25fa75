//! Shared header stores.

use http::{HeaderMap, HeaderName, HeaderValue, header};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Headers shared by every route of an [`Http`](crate::Http) instance.
///
/// Routes read the store when they are called, so updates apply to every
/// call made afterwards. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct HeaderStore {
    inner: Arc<RwLock<HeaderMap>>,
}

impl HeaderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole map.
    pub fn set(&self, headers: HeaderMap) {
        *self.inner.write() = headers;
    }

    /// Insert or replace a header.
    pub fn insert(&self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<()> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::RequestBuild(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::RequestBuild(format!("invalid header value: {e}")))?;
        self.inner.write().insert(name, value);
        Ok(())
    }

    /// Remove a header.
    pub fn remove(&self, name: impl AsRef<str>) {
        self.inner.write().remove(name.as_ref());
    }

    /// Remove every header.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Copy of the current headers.
    pub fn snapshot(&self) -> HeaderMap {
        self.inner.read().clone()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Set a bearer `Authorization` header.
    pub fn bearer(&self, token: impl AsRef<str>) -> Result<()> {
        self.insert(header::AUTHORIZATION, format!("Bearer {}", token.as_ref()))
    }

    /// Set a basic `Authorization` header.
    pub fn basic(&self, username: impl AsRef<str>, password: Option<&str>) -> Result<()> {
        use base64::Engine;
        let credentials = match password {
            Some(p) => format!("{}:{}", username.as_ref(), p),
            None => format!("{}:", username.as_ref()),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.insert(header::AUTHORIZATION, format!("Basic {}", encoded))
    }

    /// Mirror an external header source.
    ///
    /// The current value is applied immediately, then every published map
    /// replaces the store contents until the sender is dropped.
    pub fn follow(&self, mut source: watch::Receiver<HeaderMap>) -> JoinHandle<()> {
        self.set(source.borrow_and_update().clone());
        let store = self.clone();
        tokio::spawn(async move {
            while source.changed().await.is_ok() {
                let headers = source.borrow_and_update().clone();
                debug!(count = headers.len(), "Header store updated");
                store.set(headers);
            }
            warn!("Header source closed, store keeps its last value");
        })
    }
}

/// Merge header maps left to right; later maps override earlier ones.
pub(crate) fn merge<'a>(layers: impl IntoIterator<Item = &'a HeaderMap>) -> HeaderMap {
    let mut merged = HeaderMap::new();
    for layer in layers {
        for name in layer.keys() {
            merged.remove(name);
            for value in layer.get_all(name) {
                merged.append(name.clone(), value.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_snapshot() {
        let store = HeaderStore::new();
        store.insert("X-Custom", "one").unwrap();
        store.insert("x-custom", "two").unwrap();

        let headers = store.snapshot();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-Custom").unwrap(), "two");
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let store = HeaderStore::new();
        assert!(store.insert("bad header", "x").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_auth_helpers() {
        let store = HeaderStore::new();
        store.bearer("token").unwrap();
        assert_eq!(store.snapshot().get("authorization").unwrap(), "Bearer token");

        store.basic("user", Some("pass")).unwrap();
        assert_eq!(
            store.snapshot().get("authorization").unwrap(),
            "Basic dXNlcjpwYXNz"
        );
    }

    #[test]
    fn test_clones_share_state() {
        let store = HeaderStore::new();
        let twin = store.clone();
        twin.insert("X-A", "1").unwrap();
        assert_eq!(store.snapshot().get("X-A").unwrap(), "1");

        store.remove("X-A");
        assert!(twin.is_empty());
    }

    #[test]
    fn test_merge_later_layers_win() {
        let mut store = HeaderMap::new();
        store.insert("x-a", HeaderValue::from_static("store"));
        store.insert("x-b", HeaderValue::from_static("store"));
        let mut route = HeaderMap::new();
        route.insert("x-b", HeaderValue::from_static("route"));

        let merged = merge([&store, &route]);
        assert_eq!(merged.get("x-a").unwrap(), "store");
        assert_eq!(merged.get("x-b").unwrap(), "route");
    }

    #[tokio::test]
    async fn test_follow_mirrors_source() {
        let mut initial = HeaderMap::new();
        initial.insert("authorization", HeaderValue::from_static("first"));
        let (tx, rx) = watch::channel(initial);

        let store = HeaderStore::new();
        let task = store.follow(rx);
        assert_eq!(store.snapshot().get("authorization").unwrap(), "first");

        let mut next = HeaderMap::new();
        next.insert("authorization", HeaderValue::from_static("second"));
        tx.send(next).unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(store.snapshot().get("authorization").unwrap(), "second");
    }
}
