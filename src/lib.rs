//! dynserve
//!
//! A minimal local HTTP server. It serves static files from a directory, echoes JSON bodies
//! back indented, and lets clients create ad-hoc endpoints: `POST` any content to a path under
//! `/dyn/` and that path can then be read with `GET` and replaced with `PUT`.
//!
//! Dynamic endpoint content is ephemeral. It lives in temporary files (or memory) that are
//! removed when the server shuts down.
//!
//! See [`api`] for the HTTP endpoints.
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod content_type;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod static_files;
pub mod store;

pub use config::{Config, Shared};
pub use registry::{Registry, SharedRegistry};
pub use store::{MemoryStore, StoreKind, TempFileStore};
