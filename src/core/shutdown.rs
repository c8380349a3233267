//! OS signal handling.
//!
//! [`wait_for_shutdown_signal`] completes when the process is asked to
//! terminate; the engine maps it to a clean stop. Only SIGINT (Ctrl-C) and
//! SIGTERM are watched: those are what interactive use and service managers
//! send. Anything harsher is allowed to kill the process outright; the
//! supervisor reads signal death as an internal fault.

/// Waits for SIGINT or SIGTERM.
///
/// `Err` means signal registration itself failed.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = sigterm.recv() => Ok(()),
    }
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
