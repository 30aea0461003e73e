// Server module entry point
// Binding, connection handling, shutdown on signal

pub mod connection;
pub mod listener;
pub mod signal;

// Rust does not allow `loop` as a module name (keyword)
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::{Result, ServeError};
use crate::handler::Handler;

pub use connection::ConnectionOptions;
pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::{start_signal_handler, SignalHandler};

/// A bound listener plus the handler it dispatches to
pub struct Server<H> {
    listener: TcpListener,
    handler: Arc<H>,
    options: Arc<ConnectionOptions>,
}

impl<H: Handler> Server<H> {
    /// Bind `addr`. Must be called from within a tokio runtime.
    pub fn bind(addr: SocketAddr, handler: H, options: ConnectionOptions) -> Result<Self> {
        let listener =
            create_listener(addr).map_err(|source| ServeError::Bind { addr, source })?;
        Ok(Self {
            listener,
            handler: Arc::new(handler),
            options: Arc::new(options),
        })
    }

    /// Address actually bound, which differs from the requested one for port 0
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        start_server_loop(self.listener, self.handler, self.options, shutdown).await;
    }
}
