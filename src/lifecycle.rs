//! Process lifecycle.
//!
//! The server runs until it receives `SIGINT` (Ctrl-C) or `SIGTERM`. At that point every
//! dynamic endpoint backing store is removed with [`turn_down`] before the process exits.
//! In-flight requests are not drained.

use crate::registry::Registry;
use tokio::signal;

/// Resolve when the process receives an interrupt or termination signal, returning the signal's
/// name.
///
/// # Errors
///
/// Returns an error if a signal handler can't be installed.
pub async fn shutdown_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    #[cfg(unix)]
    let terminate = async move {
        terminate.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        res = signal::ctrl_c() => res.map(|()| "SIGINT"),
        () = terminate => Ok("SIGTERM"),
    }
}

/// Remove every backing store held by `registry`, returning how many were removed.
pub async fn turn_down(registry: &Registry) -> usize {
    let removed = registry.teardown().await;
    tracing::info!("removed {removed} dynamic endpoint backing store(s)");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreKind;

    #[tokio::test]
    async fn turn_down_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::new(StoreKind::TempFile, Some(dir.path().to_path_buf()));
        registry.create("/dyn/one", b"1").await.unwrap();
        registry.create("/dyn/two", b"2").await.unwrap();

        assert_eq!(turn_down(&registry).await, 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(turn_down(&registry).await, 0);
    }
}
