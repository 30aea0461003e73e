//! HTTP protocol layer module
//!
//! Protocol-level building blocks (content types, fixed headers, cache
//! validation, response builders) kept apart from file lookup.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use headers::HeaderSet;
pub use mime::MimeTable;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_500_response,
    build_error_response, build_file_response, build_html_response, build_redirect_response,
    HttpResponse,
};
