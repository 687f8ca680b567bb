use crate::error::Error;
use crate::store::BackingStore;
use axum::body::Bytes;

#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    contents: Bytes,
}

impl MemoryStore {
    pub fn new(contents: Bytes) -> Self {
        Self { contents }
    }
}

#[async_trait::async_trait]
impl BackingStore for MemoryStore {
    async fn read_all(&self) -> Result<Bytes, Error> {
        Ok(self.contents.clone())
    }

    fn discard(self: Box<Self>) -> Result<(), Error> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("<memory: {} bytes>", self.contents.len())
    }
}
