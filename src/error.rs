//! Error types shared by startup and request handling.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use hyper::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServeError>;

#[derive(Debug, Error)]
pub enum ServeError {
    /// Listener could not be bound (port in use, missing permission)
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Requested resource is absent or resolves outside the root
    #[error("not found")]
    NotFound,

    /// Unexpected failure while reading from disk
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Request the HTTP layer could not parse
    #[error("malformed request: {0}")]
    MalformedRequest(#[source] hyper::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid server address '{0}'")]
    Address(String),

    #[error("root directory '{}' is not usable: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] io::Error),
}

impl ServeError {
    /// Map an I/O error from a per-request file operation.
    ///
    /// Missing and inaccessible files are both reported as not found.
    pub fn from_file_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Self::NotFound,
            _ => Self::Io(err),
        }
    }

    /// HTTP status a request-level error is surfaced as
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
