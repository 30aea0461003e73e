//! Request handler module
//!
//! A [`Handler`] turns a request into a response. [`StaticFiles`] serves the
//! site root, and [`WithHeaders`] wraps any handler to stamp the fixed header
//! set onto whatever it returns.

pub mod listing;
pub mod resolve;
pub mod router;
pub mod static_files;

use std::future::Future;
use std::sync::Arc;

use hyper::Request;

use crate::config::Site;
use crate::http::{HeaderSet, HttpResponse};

pub use static_files::StaticFiles;

/// Request handling capability
///
/// Only the request head is passed on; GET and HEAD carry no body.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, req: Request<()>) -> impl Future<Output = HttpResponse> + Send;
}

/// Adds a fixed [`HeaderSet`] to every response of the inner handler
#[derive(Debug, Clone)]
pub struct WithHeaders<H> {
    inner: H,
    headers: HeaderSet,
}

impl<H> WithHeaders<H> {
    pub const fn new(inner: H, headers: HeaderSet) -> Self {
        Self { inner, headers }
    }
}

impl<H: Handler> Handler for WithHeaders<H> {
    async fn handle(&self, req: Request<()>) -> HttpResponse {
        let mut resp = self.inner.handle(req).await;
        self.headers.apply(resp.headers_mut());
        resp
    }
}

/// Static file handler for `site`, with the site's header set applied
pub fn site_handler(site: Arc<Site>) -> WithHeaders<StaticFiles> {
    let headers = site.headers.clone();
    WithHeaders::new(StaticFiles::new(site), headers)
}
