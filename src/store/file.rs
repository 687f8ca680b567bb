//! A temporary file-backed implementation of the [`BackingStore`][super::BackingStore] trait.
use crate::error::Error;
use crate::store::BackingStore;
use axum::body::Bytes;
use std::path::Path;
use tempfile::{Builder, TempPath};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// File name prefix for every temporary file created by a [`TempFileStore`].
pub const TEMP_FILE_PREFIX: &str = "dynserve";

/// A backing store kept in a named temporary file. The file is deleted when the store is
/// [discarded][BackingStore::discard], or failing that, when the store is dropped.
#[derive(Debug)]
pub struct TempFileStore {
    path: TempPath,
}

impl TempFileStore {
    /// Create a temporary file in `dir` (or the OS temp directory) and write `contents` to it.
    /// The content is flushed before the store is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the file can't be created or written.
    pub async fn create(dir: Option<&Path>, contents: &[u8]) -> Result<Self, Error> {
        let mut builder = Builder::new();
        builder.prefix(TEMP_FILE_PREFIX);
        let named = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(Error::Storage)?;

        let (file, path) = named.into_parts();
        let mut file = File::from_std(file);
        file.write_all(contents).await.map_err(Error::Storage)?;
        file.flush().await.map_err(Error::Storage)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl BackingStore for TempFileStore {
    async fn read_all(&self) -> Result<Bytes, Error> {
        Ok(tokio::fs::read(&self.path).await?.into())
    }

    fn discard(self: Box<Self>) -> Result<(), Error> {
        self.path.close().map_err(Error::Storage)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
