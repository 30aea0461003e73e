//! HTTP response building module
//!
//! Builders for each status the server emits. None of them panic: a builder
//! failure is logged and replaced by an empty response with the same status.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, LOCATION};
use hyper::{Response, StatusCode};

use crate::error::ServeError;

pub type HttpResponse = Response<Full<Bytes>>;

/// Build 200 response carrying a file body
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    last_modified: Option<&str>,
    is_head: bool,
) -> HttpResponse {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length);
    if let Some(modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, modified);
    }

    finish(builder, body, StatusCode::OK)
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> HttpResponse {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length);
    finish(builder, body, StatusCode::OK)
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: &str) -> HttpResponse {
    let builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(LAST_MODIFIED, last_modified);
    finish(builder, Bytes::new(), StatusCode::NOT_MODIFIED)
}

/// Build 301 redirect, used to add the trailing slash to directory URLs
pub fn build_redirect_response(location: &str) -> HttpResponse {
    let builder = Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0);
    finish(builder, Bytes::new(), StatusCode::MOVED_PERMANENTLY)
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> HttpResponse {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found", is_head)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    let body = "405 Method Not Allowed";
    let builder = Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, "GET, HEAD");
    finish(builder, Bytes::from(body), StatusCode::METHOD_NOT_ALLOWED)
}

/// Build 500 Internal Server Error response
pub fn build_500_response(is_head: bool) -> HttpResponse {
    build_text_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "500 Internal Server Error",
        is_head,
    )
}

/// Response surfacing a request-level error
pub fn build_error_response(error: &ServeError, is_head: bool) -> HttpResponse {
    match error.status() {
        StatusCode::NOT_FOUND => build_404_response(is_head),
        _ => build_500_response(is_head),
    }
}

fn build_text_response(status: StatusCode, text: &'static str, is_head: bool) -> HttpResponse {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(text.as_bytes())
    };
    let builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_LENGTH, text.len());
    finish(builder, body, status)
}

fn finish(builder: hyper::http::response::Builder, body: Bytes, status: StatusCode) -> HttpResponse {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        crate::logger::log_error(&format!("Failed to build {status} response: {e}"));
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = status;
        fallback
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(resp: HttpResponse) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let resp = build_file_response(Bytes::from_static(b"abcdef"), "text/css", None, true);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "6");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_file_response_headers() {
        let resp = build_file_response(
            Bytes::from_static(b"\0asm"),
            "application/wasm",
            Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            false,
        );
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/wasm");
        assert_eq!(resp.headers()[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(body_bytes(resp).await.as_ref(), b"\0asm");
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            build_error_response(&ServeError::NotFound, false).status(),
            StatusCode::NOT_FOUND
        );
        let io = ServeError::Io(std::io::Error::other("boom"));
        assert_eq!(
            build_error_response(&io, false).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(build_405_response().headers()[ALLOW], "GET, HEAD");
    }

    #[test]
    fn test_redirect() {
        let resp = build_redirect_response("/pkg/");
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "/pkg/");
    }
}
