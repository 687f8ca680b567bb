use crate::api::routes;
use crate::config::Shared;
use crate::error::Error;
use crate::registry::SharedRegistry;
use axum::Router;
use std::future::Future;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: Shared,
    pub registry: SharedRegistry,
}

/// Build the HTTP [`Router`] without binding a listener.
pub fn app(config: Shared, registry: SharedRegistry) -> Router {
    routes::new(AppState { config, registry })
}

/// Bind [`Config::bind_addr`][crate::config::Config::bind_addr] and return the server future.
///
/// # Errors
///
/// Returns [`Error::Hyper`] if the address can't be bound.
pub fn new(
    config: Shared,
    registry: SharedRegistry,
) -> Result<impl Future<Output = hyper::Result<()>>, Error> {
    let server = axum::Server::try_bind(&config.bind_addr())?;
    Ok(server.serve(app(config, registry).into_make_service()))
}
