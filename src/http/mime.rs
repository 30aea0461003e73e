//! MIME type detection module
//!
//! Maps file extensions to `Content-Type` values. The site table takes
//! precedence; extensions it does not list fall through to a wider built-in
//! table, and only then to the table's empty-string fallback entry.

use std::collections::HashMap;
use std::path::Path;

/// Content type used when nothing else matches
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Default site table, keyed by extension including the leading dot
const DEFAULT_TABLE: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".js", "application/javascript"),
    (".wasm", "application/wasm"),
    (".css", "text/css"),
    (".json", "application/json"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".svg", "image/svg+xml"),
    ("", OCTET_STREAM),
];

/// Extension to content type table.
///
/// Keys are extensions with their leading dot (`".wasm"`); the empty key
/// holds the fallback type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeTable {
    entries: HashMap<String, String>,
}

impl MimeTable {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Exact table lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Type for files whose extension matched nothing
    pub fn fallback(&self) -> &str {
        self.get("").unwrap_or(OCTET_STREAM)
    }

    /// Resolve the content type for a file path
    ///
    /// # Examples
    /// ```
    /// use std::path::Path;
    /// use wasm_devserver::http::mime::MimeTable;
    ///
    /// let table = MimeTable::default();
    /// assert_eq!(table.content_type_for(Path::new("power_calc.wasm")), "application/wasm");
    /// assert_eq!(table.content_type_for(Path::new("README")), "application/octet-stream");
    /// ```
    pub fn content_type_for(&self, path: &Path) -> &str {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return self.fallback();
        };

        let key = format!(".{ext}");
        if let Some(found) = self.get(&key) {
            return found;
        }
        let lower = key.to_ascii_lowercase();
        if let Some(found) = self.get(&lower) {
            return found;
        }

        match builtin_content_type(&lower[1..]) {
            Some(found) => found,
            None => self.fallback(),
        }
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::from_entries(DEFAULT_TABLE.iter().copied())
    }
}

/// Wider built-in table for extensions the site table does not list
///
/// `extension` is lowercase and has no leading dot.
pub fn builtin_content_type(extension: &str) -> Option<&'static str> {
    let content_type = match extension {
        // Text
        "htm" => "text/html",
        "txt" | "md" => "text/plain",
        "xml" => "application/xml",
        "csv" => "text/csv",

        // Scripts and modules
        "mjs" | "cjs" => "application/javascript",
        "map" => "application/json",
        "wat" => "text/plain",

        // Images
        "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Media
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Archives and documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",

        _ => return None,
    };
    Some(content_type)
}
