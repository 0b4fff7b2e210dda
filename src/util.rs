//! Helpers for running blocking file I/O off the async runtime.

use std::time::Duration;

use tokio::task::spawn_blocking;
use tokio::time::timeout;

use crate::{Error, Result};

/// Runs `f` on the blocking pool and waits for it to finish.
///
/// Used for writes: once `f` may have touched the disk its result is the
/// only honest answer, so there is no deadline.
pub async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match spawn_blocking(f).await {
        Ok(inner) => inner,
        Err(join_err) => Err(Error::TaskJoin(join_err.to_string())),
    }
}

/// Runs `f` on the blocking pool and gives up after `duration`. A timed-out
/// call surfaces as `Error::Timeout`, which callers treat as a transport
/// failure. `f` keeps running after the deadline and its result is dropped,
/// so only use this for work that is safe to abandon.
pub async fn blocking_with_timeout<F, T>(duration: Duration, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match timeout(duration, spawn_blocking(f)).await {
        Ok(Ok(inner)) => inner,
        Ok(Err(join_err)) => Err(Error::TaskJoin(join_err.to_string())),
        Err(_) => Err(Error::Timeout(duration)),
    }
}
