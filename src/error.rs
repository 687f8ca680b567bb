//! Error types.

use axum::extract::rejection::BytesRejection;
use std::path::PathBuf;

/// Error enumerates the possible dynserve error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a [`/file/{path}` request][crate::api#filepath-gethead] names a file that
    /// can't be opened under [`Config::root`][crate::config::Config::root], or names a dotfile
    /// while [`Config::dotfiles`][crate::config::Config::dotfiles] is off.
    #[error("File Not Found")]
    FileNotFound,

    /// Returned when a dynamic endpoint is read or updated while it is being torn down, or when
    /// its backing store can't be read.
    #[error("no dynamic endpoint at {0}")]
    EndpointNotFound(String),

    /// Returned for any request that doesn't match a route, including reads and updates of a
    /// dynamic endpoint that was never created.
    #[error("404 File Not Found!")]
    RouteNotFound(String),

    /// Returned when clients `POST` a [dynamic endpoint][crate::api#dynpath-post] that already
    /// exists. The existing endpoint is left untouched.
    #[error("Cannot POST to same URL twice")]
    EndpointExists(String),

    /// Returned when a backing store can't be allocated or filled.
    #[error("could not allocate backing store")]
    Storage(#[source] std::io::Error),

    /// Returned when an [echo request][crate::api#echo-postputpatch] body, or a
    /// [config file][crate::config::Config::try_from_file], isn't valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when a request body can't be read.
    #[error("can't read body")]
    BodyRejection(#[from] BytesRejection),

    /// Returned when [`Config::root`][crate::config::Config::root] isn't a directory.
    #[error("root path {0:?} is not a directory")]
    InvalidRoot(PathBuf),

    /// Returned when [`Config::timeout`][crate::config::Config::timeout] is zero.
    #[error("request timeout must be greater than zero")]
    InvalidTimeout,

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when the HTTP listener can't be bound or fails while serving.
    #[error("HTTP server error")]
    Hyper(#[from] hyper::Error),
}
