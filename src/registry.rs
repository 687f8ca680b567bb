//! Dynamic endpoint registry.
//!
//! Clients create a dynamic endpoint by `POST`ing content to any path under `/dyn/`. The path
//! then answers `GET`/`HEAD` with the most recent content and accepts `PUT` to replace it.
//! Each endpoint's content lives in a [`BackingStore`][crate::store::BackingStore] owned by the
//! registry. Stores are only removed when the registry is [torn down][Registry::teardown] at
//! shutdown; there is no per-endpoint delete.
//!
//! # Consistency
//!
//! Creation fills the new backing store before touching the path map, then checks for an
//! existing endpoint and inserts under a single write lock. Two concurrent `POST`s to the same
//! path produce exactly one endpoint; the loser's store is discarded.
//!
//! Each endpoint guards its store with its own [`RwLock`]. Reads hold the read lock for the
//! whole read. Updates fill the replacement store first and only then take the write lock to
//! swap it in. A read therefore returns either the old or the new content in full.

use crate::config::Config;
use crate::error::Error;
use crate::store::{DynBackingStore, StoreKind};
use axum::body::Bytes;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// `SharedRegistry` is a [`Registry`] shared between request handlers and the
/// [lifecycle manager][crate::lifecycle].
pub type SharedRegistry = Arc<Registry>;

#[derive(Debug)]
struct Endpoint {
    // `None` once the registry has been torn down.
    store: RwLock<Option<DynBackingStore>>,
}

#[derive(Debug)]
pub struct Registry {
    endpoints: RwLock<BTreeMap<String, Arc<Endpoint>>>,
    store_kind: StoreKind,
    temp_dir: Option<PathBuf>,
}

impl Registry {
    pub fn new(store_kind: StoreKind, temp_dir: Option<PathBuf>) -> Self {
        Self {
            endpoints: RwLock::default(),
            store_kind,
            temp_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.store, config.temp_dir.clone())
    }

    /// Register a new endpoint at `url_path` holding `body`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndpointExists`] if `url_path` is already registered, leaving the
    /// existing endpoint unchanged.
    ///
    /// Returns [`Error::Storage`] if the backing store can't be allocated.
    pub async fn create(&self, url_path: &str, body: &[u8]) -> Result<(), Error> {
        if self.endpoints.read().await.contains_key(url_path) {
            return Err(Error::EndpointExists(url_path.to_string()));
        }
        let store = self.allocate(body).await?;

        let mut endpoints = self.endpoints.write().await;
        if endpoints.contains_key(url_path) {
            drop(endpoints);
            discard(url_path, store);
            return Err(Error::EndpointExists(url_path.to_string()));
        }
        tracing::debug!("{url_path} backed by {}", store.describe());
        endpoints.insert(
            url_path.to_string(),
            Arc::new(Endpoint {
                store: RwLock::new(Some(store)),
            }),
        );
        Ok(())
    }

    /// Read the full content of the endpoint at `url_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RouteNotFound`] if `url_path` isn't registered.
    ///
    /// Returns [`Error::EndpointNotFound`] if the endpoint is being torn down, or if its backing
    /// store can't be read.
    pub async fn read(&self, url_path: &str) -> Result<Bytes, Error> {
        let endpoint = self.lookup(url_path).await?;
        let store = endpoint.store.read().await;
        let Some(store) = store.as_ref() else {
            return Err(Error::EndpointNotFound(url_path.to_string()));
        };
        let contents = store.read_all().await;
        contents.map_err(|err| {
            tracing::warn!("could not read data for path {url_path}: {err}");
            Error::EndpointNotFound(url_path.to_string())
        })
    }

    /// Replace the content of the endpoint at `url_path` with `body`. The previous backing
    /// store is discarded once the new one is in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RouteNotFound`] if `url_path` isn't registered, and
    /// [`Error::EndpointNotFound`] if the endpoint is being torn down.
    ///
    /// Returns [`Error::Storage`] if the replacement backing store can't be allocated, in
    /// which case the endpoint keeps its previous content.
    pub async fn update(&self, url_path: &str, body: &[u8]) -> Result<(), Error> {
        let endpoint = self.lookup(url_path).await?;
        let replacement = self.allocate(body).await?;

        let previous = {
            let mut store = endpoint.store.write().await;
            if store.is_none() {
                drop(store);
                discard(url_path, replacement);
                return Err(Error::EndpointNotFound(url_path.to_string()));
            }
            store.replace(replacement)
        };
        if let Some(previous) = previous {
            discard(url_path, previous);
        }
        Ok(())
    }

    /// Discard every backing store and forget every endpoint, returning the number of stores
    /// removed. Reads and updates racing with teardown observe [`Error::EndpointNotFound`];
    /// later ones find no endpoint at all.
    pub async fn teardown(&self) -> usize {
        let endpoints = std::mem::take(&mut *self.endpoints.write().await);
        let mut removed = 0;
        for (url_path, endpoint) in endpoints {
            if let Some(store) = endpoint.store.write().await.take() {
                tracing::info!("removing {} for {url_path}", store.describe());
                discard(&url_path, store);
                removed += 1;
            }
        }
        removed
    }

    pub async fn paths(&self) -> Vec<String> {
        self.endpoints.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.endpoints.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.endpoints.read().await.is_empty()
    }

    async fn lookup(&self, url_path: &str) -> Result<Arc<Endpoint>, Error> {
        let endpoint = self.endpoints.read().await.get(url_path).cloned();
        endpoint.ok_or_else(|| {
            tracing::info!("cannot find: {url_path}");
            Error::RouteNotFound(url_path.to_string())
        })
    }

    async fn allocate(&self, body: &[u8]) -> Result<DynBackingStore, Error> {
        self.store_kind
            .allocate(self.temp_dir.as_deref(), body)
            .await
            .map_err(|err| {
                tracing::warn!("could not allocate backing store: {err}");
                err
            })
    }
}

fn discard(url_path: &str, store: DynBackingStore) {
    let description = store.describe();
    if let Err(err) = store.discard() {
        tracing::warn!("could not remove {description} for {url_path}: {err}");
    }
}
