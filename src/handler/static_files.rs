//! Static file serving module
//!
//! Handles file lookup under the site root, index files, directory
//! listings, and response building.

use std::fs::Metadata;
use std::path::Path;
use std::sync::Arc;

use hyper::body::Bytes;
use hyper::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH};
use hyper::{Method, Request};
use tokio::fs;

use super::{listing, resolve, Handler};
use crate::config::Site;
use crate::error::{Result, ServeError};
use crate::http::{self, cache, HttpResponse};

/// Serves files from a [`Site`] root
#[derive(Debug, Clone)]
pub struct StaticFiles {
    site: Arc<Site>,
}

impl StaticFiles {
    pub const fn new(site: Arc<Site>) -> Self {
        Self { site }
    }

    /// Look up and serve the resource named by `req`
    pub async fn serve(&self, req: &Request<()>) -> Result<HttpResponse> {
        let url_path = req.uri().path();
        let path = resolve::resolve(self.site.root(), url_path).await?;
        let meta = fs::metadata(&path).await.map_err(ServeError::from_file_io)?;

        if meta.is_dir() {
            return self.serve_directory(req, &path).await;
        }
        // "/file.js/" names a directory that does not exist
        if url_path.ends_with('/') {
            return Err(ServeError::NotFound);
        }
        serve_file(req, &self.site, &path, &meta).await
    }

    async fn serve_directory(&self, req: &Request<()>, dir: &Path) -> Result<HttpResponse> {
        let url_path = req.uri().path();
        if !url_path.ends_with('/') {
            // "//host" in Location would be read as another origin
            let local = url_path.trim_start_matches('/');
            let location = match req.uri().query() {
                Some(q) => format!("/{local}/?{q}"),
                None => format!("/{local}/"),
            };
            return Ok(http::build_redirect_response(&location));
        }

        for index in &self.site.index_files {
            let Ok(candidate) = resolve::confine(self.site.root(), &dir.join(index)).await else {
                continue;
            };
            if let Ok(meta) = fs::metadata(&candidate).await {
                if meta.is_file() {
                    return serve_file(req, &self.site, &candidate, &meta).await;
                }
            }
        }

        if !self.site.directory_listing {
            return Err(ServeError::NotFound);
        }
        let html = listing::render(dir, url_path).await?;
        Ok(http::build_html_response(html, is_head(req)))
    }
}

impl Handler for StaticFiles {
    async fn handle(&self, req: Request<()>) -> HttpResponse {
        super::router::handle_request(self, req).await
    }
}

async fn serve_file(
    req: &Request<()>,
    site: &Site,
    path: &Path,
    meta: &Metadata,
) -> Result<HttpResponse> {
    let modified = meta.modified().ok();
    let last_modified = modified.map(cache::format_http_date);

    // If-None-Match takes precedence; without ETags it can never match
    if !req.headers().contains_key(IF_NONE_MATCH) {
        if let (Some(time), Some(stamp)) = (modified, last_modified.as_deref()) {
            let since = req
                .headers()
                .get(IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok());
            if cache::not_modified_since(since, time) {
                return Ok(http::build_304_response(stamp));
            }
        }
    }

    let content = fs::read(path).await.map_err(ServeError::from_file_io)?;
    let content_type = site.mime.content_type_for(path);

    Ok(http::build_file_response(
        Bytes::from(content),
        content_type,
        last_modified.as_deref(),
        is_head(req),
    ))
}

fn is_head(req: &Request<()>) -> bool {
    req.method() == Method::HEAD
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{CONTENT_TYPE, LAST_MODIFIED, LOCATION};
    use hyper::StatusCode;

    fn site_in(dir: &Path) -> StaticFiles {
        StaticFiles::new(Arc::new(Site::new(dir).unwrap()))
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_file_with_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("power_calc.wasm"), b"\0asm\x01\0\0\0").unwrap();

        let files = site_in(dir.path());
        let resp = files.serve(&get("/power_calc.wasm")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/wasm");
        assert!(resp.headers().contains_key(LAST_MODIFIED));
    }

    #[tokio::test]
    async fn test_directory_redirect_keeps_query() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();

        let files = site_in(dir.path());
        let resp = files.serve(&get("/pkg?x=1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "/pkg/?x=1");
    }

    #[tokio::test]
    async fn test_directory_redirect_stays_on_origin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("evil.example")).unwrap();

        let files = site_in(dir.path());
        let resp = files.serve(&get("//evil.example")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "/evil.example/");

        let resp = files.serve(&get("///evil.example?next=1")).await.unwrap();
        assert_eq!(resp.headers()[LOCATION], "/evil.example/?next=1");
    }

    #[tokio::test]
    async fn test_directory_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("demo")).unwrap();
        std::fs::write(dir.path().join("demo").join("index.htm"), b"<p>htm</p>").unwrap();

        let files = site_in(dir.path());
        let resp = files.serve(&get("/demo/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html");
    }

    #[tokio::test]
    async fn test_directory_listing_toggle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let files = site_in(dir.path());
        let resp = files.serve(&get("/")).await.unwrap();
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");

        let mut site = Site::new(dir.path()).unwrap();
        site.directory_listing = false;
        let files = StaticFiles::new(Arc::new(site));
        assert!(matches!(files.serve(&get("/")).await, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_trailing_slash_on_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), b"1").unwrap();

        let files = site_in(dir.path());
        assert!(matches!(
            files.serve(&get("/app.js/")).await,
            Err(ServeError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();
        let files = site_in(dir.path());

        let first = files.serve(&get("/style.css")).await.unwrap();
        let stamp = first.headers()[LAST_MODIFIED].to_str().unwrap().to_string();

        let conditional = Request::builder()
            .uri("/style.css")
            .header(IF_MODIFIED_SINCE, &stamp)
            .body(())
            .unwrap();
        let resp = files.serve(&conditional).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

        let with_etag = Request::builder()
            .uri("/style.css")
            .header(IF_MODIFIED_SINCE, &stamp)
            .header(IF_NONE_MATCH, "\"abc\"")
            .body(())
            .unwrap();
        let resp = files.serve(&with_etag).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
