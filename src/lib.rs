//! Local static file server for WebAssembly development.
//!
//! Serves a directory over HTTP with the cross-origin isolation headers
//! (`Cross-Origin-Opener-Policy` / `Cross-Origin-Embedder-Policy`) that
//! browsers require before enabling shared WebAssembly memory, plus
//! permissive CORS.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{Config, Site};
pub use error::{Result, ServeError};
pub use handler::{site_handler, Handler, StaticFiles, WithHeaders};
pub use server::{ConnectionOptions, Server};
