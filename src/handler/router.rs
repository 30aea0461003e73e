//! Request dispatch module
//!
//! Entry point for request processing: method validation, then file lookup,
//! then mapping of lookup errors to responses.

use hyper::{Method, Request};

use super::static_files::StaticFiles;
use crate::error::ServeError;
use crate::http::{self, HttpResponse};
use crate::logger;

/// Main entry point for HTTP request handling
pub async fn handle_request(files: &StaticFiles, req: Request<()>) -> HttpResponse {
    if let Some(resp) = check_http_method(req.method()) {
        return resp;
    }
    let is_head = req.method() == Method::HEAD;

    match files.serve(&req).await {
        Ok(resp) => resp,
        Err(ServeError::NotFound) => http::build_404_response(is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to serve '{}': {e}", req.uri().path()));
            http::build_error_response(&e, is_head)
        }
    }
}

/// Only GET and HEAD are served
fn check_http_method(method: &Method) -> Option<HttpResponse> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => Some(http::build_405_response()),
    }
}
