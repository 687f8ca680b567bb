//! Backing stores for dynamic endpoints.
//!
//! A backing store holds the bytes most recently `POST`ed or `PUT` to a
//! [dynamic endpoint][crate::registry]. Two implementations are provided,
//! [`file::TempFileStore`] and [`memory::MemoryStore`]. The former keeps content in a temporary
//! file that is removed when the store is discarded. The latter keeps content in memory.
//!
//! Neither is durable across restarts.

use crate::error::Error;
use axum::body::Bytes;
use serde::Deserialize;
use std::fmt::Debug;
use std::path::Path;

pub mod file;
pub mod memory;

pub use file::TempFileStore;
pub use memory::MemoryStore;

/// A boxed [`BackingStore`] owned by a single dynamic endpoint.
pub type DynBackingStore = Box<dyn BackingStore + Send + Sync>;

/// An async trait describing ephemeral byte storage for a single dynamic endpoint.
#[async_trait::async_trait]
pub trait BackingStore: Debug {
    /// Read the full content of the store from its start.
    async fn read_all(&self) -> Result<Bytes, Error>;

    /// Remove the store from persistent storage.
    fn discard(self: Box<Self>) -> Result<(), Error>;

    /// Describe where the store lives, for logging.
    fn describe(&self) -> String;
}

/// Selects the [`BackingStore`] implementation used for new dynamic endpoints.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    #[value(name = "tempfile")]
    TempFile,
    Memory,
}

impl StoreKind {
    /// Allocate a new store of this kind holding `contents`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if a temporary file can't be created or written.
    pub async fn allocate(
        self,
        temp_dir: Option<&Path>,
        contents: &[u8],
    ) -> Result<DynBackingStore, Error> {
        let store: DynBackingStore = match self {
            Self::TempFile => Box::new(TempFileStore::create(temp_dir, contents).await?),
            Self::Memory => Box::new(MemoryStore::new(Bytes::copy_from_slice(contents))),
        };
        Ok(store)
    }
}
