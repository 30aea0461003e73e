// Connection handling module
// Serves a single accepted TCP connection on its own task

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::body::{Body as _, Incoming};
use hyper::header::{REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Version};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::config::Config;
use crate::error::ServeError;
use crate::handler::Handler;
use crate::http::HttpResponse;
use crate::logger::{self, AccessLogEntry};

/// Per-connection behavior, fixed at startup
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub keep_alive: bool,
    /// Upper bound on a connection's lifetime
    pub timeout: Option<Duration>,
    /// Time in-flight connections get after shutdown begins
    pub shutdown_grace: Duration,
    /// Access log format; `None` disables access logging
    pub access_log_format: Option<String>,
}

impl ConnectionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            keep_alive: config.http.keep_alive,
            timeout: config.performance.connection_timeout.map(Duration::from_secs),
            shutdown_grace: Duration::from_millis(config.server.shutdown_grace_ms),
            access_log_format: config
                .logging
                .access_log
                .then(|| config.logging.access_log_format.clone()),
        }
    }
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            keep_alive: true,
            timeout: None,
            shutdown_grace: Duration::from_millis(500),
            access_log_format: None,
        }
    }
}

/// Spawn a task serving `stream`.
///
/// `active` is incremented here and decremented when the task finishes.
/// Once `stop` flips, idle keep-alive connections are closed and in-flight
/// requests are allowed to finish.
pub fn accept_connection<H: Handler>(
    stream: TcpStream,
    peer_addr: SocketAddr,
    handler: &Arc<H>,
    options: &Arc<ConnectionOptions>,
    active: &Arc<AtomicUsize>,
    mut stop: watch::Receiver<bool>,
) {
    active.fetch_add(1, Ordering::SeqCst);

    let handler = Arc::clone(handler);
    let options = Arc::clone(options);
    let active = Arc::clone(active);

    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout = options.timeout;

        let mut builder = http1::Builder::new();
        builder.keep_alive(options.keep_alive);

        let service = service_fn(move |req| {
            let handler = Arc::clone(&handler);
            let options = Arc::clone(&options);
            async move { Ok::<_, Infallible>(serve_request(req, peer_addr, &*handler, &options).await) }
        });

        let conn = builder.serve_connection(io, service);
        tokio::pin!(conn);

        let serve = async {
            tokio::select! {
                res = conn.as_mut() => res,
                _ = stop.changed() => {
                    conn.as_mut().graceful_shutdown();
                    conn.as_mut().await
                }
            }
        };

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, serve).await.ok(),
            None => Some(serve.await),
        };

        match result {
            Some(Ok(())) => {}
            Some(Err(err)) if err.is_parse() => {
                logger::log_warning(&format!(
                    "{} from {peer_addr}",
                    ServeError::MalformedRequest(err)
                ));
            }
            Some(Err(err)) => logger::log_connection_error(&err),
            None => logger::log_warning(&format!("Connection from {peer_addr} timed out")),
        }

        active.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Hand one request to the handler and record it in the access log
async fn serve_request<H: Handler>(
    req: Request<Incoming>,
    peer_addr: SocketAddr,
    handler: &H,
    options: &ConnectionOptions,
) -> HttpResponse {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();
    let entry = options
        .access_log_format
        .as_ref()
        .map(|_| access_entry(&parts, peer_addr));

    let resp = handler.handle(Request::from_parts(parts, ())).await;

    if let (Some(mut entry), Some(format)) = (entry, options.access_log_format.as_deref()) {
        entry.status = resp.status().as_u16();
        entry.body_bytes = resp.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, format);
    }
    resp
}

fn access_entry(parts: &Parts, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
