// Server loop module
// Accepts connections until shutdown, then drains in-flight work

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::{accept_connection, ConnectionOptions};
use crate::handler::Handler;
use crate::logger;

/// How often the drain checks the active connection count
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Accept connections on `listener` until `shutdown` resolves.
///
/// A failed accept is logged and the loop keeps going. After shutdown the
/// listener is closed first, then in-flight connections get up to
/// `options.shutdown_grace` before being abandoned.
pub async fn start_server_loop<H, F>(
    listener: TcpListener,
    handler: Arc<H>,
    options: Arc<ConnectionOptions>,
    shutdown: F,
) where
    H: Handler,
    F: Future<Output = ()>,
{
    let active = Arc::new(AtomicUsize::new(0));
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &handler,
                            &options,
                            &active,
                            stop_rx.clone(),
                        );
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
        }
    }

    drop(listener);
    let _ = stop_tx.send(true);
    drain_connections(&active, options.shutdown_grace).await;
}

/// Wait for `active` to reach zero, giving up after `grace`
async fn drain_connections(active: &AtomicUsize, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = active.load(Ordering::SeqCst);
        if remaining == 0 {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Abandoning {remaining} connection(s) still open after {}ms",
                grace.as_millis()
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let active = AtomicUsize::new(0);
        tokio::time::timeout(
            Duration::from_millis(200),
            drain_connections(&active, Duration::from_secs(60)),
        )
        .await
        .expect("no connections to wait for");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_grace() {
        let active = AtomicUsize::new(2);
        let started = tokio::time::Instant::now();
        drain_connections(&active, Duration::from_millis(300)).await;
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(active.load(Ordering::SeqCst), 2);
    }
}
