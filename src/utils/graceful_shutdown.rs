use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;

/// Represents different shutdown reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl-C / SIGINT
    Interrupt,
    /// SIGTERM
    Terminate,
    /// Triggered from code rather than by the OS
    Requested,
}

/// Fans a single shutdown decision out to every listener
pub struct GracefulShutdown {
    /// Broadcast sender for shutdown signals
    shutdown_tx: broadcast::Sender<ShutdownReason>,
    /// Flag indicating if shutdown has been initiated
    shutdown_initiated: AtomicBool,
    /// Maximum time in-flight connections get to finish
    shutdown_timeout: Duration,
}

impl Default for GracefulShutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl GracefulShutdown {
    /// Create a new GracefulShutdown manager with default 30-second timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new GracefulShutdown manager with custom timeout
    pub fn with_timeout(shutdown_timeout: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);
        Self {
            shutdown_tx,
            shutdown_initiated: AtomicBool::new(false),
            shutdown_timeout,
        }
    }

    /// Get a receiver for shutdown signals
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.shutdown_tx.subscribe()
    }

    pub fn timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::Relaxed)
    }

    /// Broadcast `reason` to all subscribers. Only the first call has any effect.
    pub fn trigger_shutdown(&self, reason: ShutdownReason) -> bool {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            tracing::info!("Shutdown triggered: {:?}", reason);
            let _ = self.shutdown_tx.send(reason);
            true
        } else {
            tracing::warn!("Shutdown already in progress, ignoring {:?}", reason);
            false
        }
    }

    /// Wait for the first OS shutdown signal and broadcast it
    pub async fn run_signal_handler(&self) -> Result<()> {
        tracing::info!("Signal handler started. Listening for SIGINT and SIGTERM");
        let reason = wait_for_signal().await?;
        tracing::info!("Received {:?}, initiating graceful shutdown...", reason);
        self.trigger_shutdown(reason);
        Ok(())
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<ShutdownReason> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            Ok(ShutdownReason::Interrupt)
        }
        _ = terminate.recv() => Ok(ShutdownReason::Terminate),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<ShutdownReason> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownReason::Interrupt)
}
