//! Static file serving from [`Config::root`][crate::config::Config::root].
//!
//! A `/file/{path}` segment is appended to the root directory as-is. It must name a single
//! entry of the root: a decoded segment containing a path separator (say from `%2F`) is refused.
//! A segment starting with `.` is also refused unless
//! [`Config::dotfiles`][crate::config::Config::dotfiles] is set.
//!
//! Files are typed by [sniffing][crate::content_type::sniff] their first 512 bytes and streamed
//! to the client in 1 MiB chunks.

use crate::config::Config;
use crate::content_type::{self, SNIFF_LEN};
use crate::error::Error;
use axum::body::{Body, Bytes};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

/// Size of each chunk written to the response body.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// An opened static file, ready to be streamed.
#[derive(Debug)]
pub struct StaticFile {
    file: File,
    len: u64,
    content_type: &'static str,
}

impl StaticFile {
    /// Resolve `segment` under the configured root and open it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if `segment` contains a path separator, if it is a
    /// dotfile and dotfiles aren't allowed, or if the resolved path can't be opened as a
    /// regular file.
    ///
    /// Returns [`Error::IO`] if the opened file can't be read.
    pub async fn open(config: &Config, segment: &str) -> Result<Self, Error> {
        let file_path = config.file_path(segment);
        tracing::debug!("resolved {segment} to {}", file_path.display());

        if segment.contains(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR) {
            tracing::warn!("attempt to leave root with {segment}");
            return Err(Error::FileNotFound);
        }
        if segment.starts_with('.') && !config.dotfiles {
            tracing::warn!("attempt to access {}", file_path.display());
            return Err(Error::FileNotFound);
        }

        let Ok(mut file) = File::open(&file_path).await else {
            return Err(Error::FileNotFound);
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(Error::FileNotFound);
        }

        let mut head = Vec::with_capacity(SNIFF_LEN);
        (&mut file).take(SNIFF_LEN as u64).read_to_end(&mut head).await?;
        file.seek(SeekFrom::Start(0)).await?;

        let content_type = content_type::sniff(&head);
        tracing::debug!("{} is {content_type}", file_path.display());

        Ok(Self {
            file,
            len: metadata.len(),
            content_type,
        })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Stream the file into a response body, one [`CHUNK_SIZE`] chunk at a time. The stream ends
    /// after the first chunk shorter than [`CHUNK_SIZE`]. A read error aborts the body.
    pub fn into_body(self) -> Body {
        let (mut sender, body) = Body::channel();
        let mut file = self.file;
        tokio::spawn(async move {
            loop {
                let chunk = match read_chunk(&mut file).await {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        tracing::warn!("aborting file stream: {err}");
                        sender.abort();
                        return;
                    }
                };
                let last = chunk.len() < CHUNK_SIZE;
                if !chunk.is_empty() && sender.send_data(chunk).await.is_err() {
                    // Client went away, or this is a HEAD response.
                    return;
                }
                if last {
                    return;
                }
            }
        });
        body
    }
}

/// Read up to [`CHUNK_SIZE`] bytes, stopping early only at end of file.
async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<Bytes> {
    let mut buf = vec![0; CHUNK_SIZE];
    let mut filled = 0;
    while filled < CHUNK_SIZE {
        match reader.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    buf.truncate(filled);
    Ok(buf.into())
}
