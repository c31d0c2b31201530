//! Graceful shutdown on SIGINT and SIGTERM.

use std::{future::Future, io};

/// How [`until_signal`] returned.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The work finished on its own.
    Finished(T),
    /// A shutdown signal arrived first.
    Signal(&'static str),
}

/// Drives `work` until it completes or `signal` resolves, whichever is first.
///
/// # Errors
///
/// Returns the error from `signal` if listening for signals failed.
pub async fn until_signal<T>(
    work: impl Future<Output = T>,
    signal: impl Future<Output = io::Result<&'static str>>,
) -> io::Result<Outcome<T>> {
    tokio::select! {
        output = work => Ok(Outcome::Finished(output)),
        signal = signal => signal.map(Outcome::Signal),
    }
}

/// Resolves with the name of the first shutdown signal received.
///
/// # Errors
///
/// Returns an error if the signal handlers cannot be installed.
#[cfg(unix)]
pub async fn signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

/// Resolves with the name of the first shutdown signal received.
///
/// # Errors
///
/// Returns an error if the signal handler cannot be installed.
#[cfg(not(unix))]
pub async fn signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
}
