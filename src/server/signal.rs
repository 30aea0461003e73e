// Signal handling module
//
// Supported signals:
// - SIGINT:  Shutdown (Ctrl+C)
// - SIGTERM: Shutdown

use std::sync::Arc;
use tokio::sync::Notify;

use crate::error::{Result, ServeError};
use crate::logger;

/// Shutdown notification shared between the signal task and the server loop
pub struct SignalHandler {
    shutdown: Notify,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Notify::new(),
        }
    }

    /// Wake the waiter.
    ///
    /// A request made before anyone waits is kept until `wait` is called.
    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        self.shutdown.notified().await;
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Install SIGINT/SIGTERM handlers (Unix)
///
/// Registration happens before this returns, so a failure is reported to the
/// caller instead of surfacing inside the background task.
#[cfg(unix)]
pub fn start_signal_handler() -> Result<Arc<SignalHandler>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).map_err(ServeError::Signal)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(ServeError::Signal)?;

    let handler = Arc::new(SignalHandler::new());
    let notify = Arc::clone(&handler);

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        };
        logger::log_shutdown_requested(name);
        notify.request_shutdown();
    });

    Ok(handler)
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler() -> Result<Arc<SignalHandler>> {
    let handler = Arc::new(SignalHandler::new());
    let notify = Arc::clone(&handler);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logger::log_shutdown_requested("Ctrl+C");
                notify.request_shutdown();
            }
            Err(e) => logger::log_error(&ServeError::Signal(e).to_string()),
        }
    });

    Ok(handler)
}
