//! Directory listing module

use std::fmt::Write as _;
use std::path::Path;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio::fs;

use crate::error::{Result, ServeError};

/// Characters left unescaped in listing links
const LINK_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

struct Entry {
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

/// Render an HTML listing of `dir`, which is served at `url_path`
pub async fn render(dir: &Path, url_path: &str) -> Result<String> {
    let mut read_dir = fs::read_dir(dir).await.map_err(ServeError::from_file_io)?;
    let mut entries = Vec::new();

    while let Some(entry) = read_dir.next_entry().await.map_err(ServeError::from_file_io)? {
        // an entry that cannot be inspected is left out of the listing
        let Ok(file_type) = entry.file_type().await else {
            continue;
        };
        let is_symlink = file_type.is_symlink();
        // follow links so a link to a directory still gets its slash
        let is_dir = if is_symlink {
            fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir())
        } else {
            file_type.is_dir()
        };
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }
    entries.sort_by_key(|e| e.name.to_lowercase());

    let title = format!(
        "Directory listing for {}",
        escape_html(&percent_decode_str(url_path).decode_utf8_lossy())
    );

    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE HTML>");
    let _ = writeln!(html, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(html, "<title>{title}</title>\n</head>\n<body>");
    let _ = writeln!(html, "<h1>{title}</h1>\n<hr>\n<ul>");
    for entry in &entries {
        let (display, link) = if entry.is_dir {
            (format!("{}/", entry.name), format!("{}/", entry.name))
        } else if entry.is_symlink {
            (format!("{}@", entry.name), entry.name.clone())
        } else {
            (entry.name.clone(), entry.name.clone())
        };
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            utf8_percent_encode(&link, LINK_ESCAPE),
            escape_html(&display)
        );
    }
    let _ = writeln!(html, "</ul>\n<hr>\n</body>\n</html>");

    Ok(html)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
    }

    #[tokio::test]
    async fn test_listing_sorted_and_marked() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.js"), b"").unwrap();
        std::fs::write(dir.path().join("A file.wasm"), b"").unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();

        let html = render(dir.path(), "/assets/").await.unwrap();
        assert!(html.contains("<title>Directory listing for /assets/</title>"));

        let a = html.find("<a href=\"A%20file.wasm\">A file.wasm</a>").unwrap();
        let b = html.find("<a href=\"b.js\">b.js</a>").unwrap();
        let pkg = html.find("<a href=\"pkg/\">pkg/</a>").unwrap();
        assert!(a < b && b < pkg);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_listing_survives_dangling_link() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), b"").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("stale")).unwrap();

        let html = render(dir.path(), "/").await.unwrap();
        assert!(html.contains("<a href=\"app.js\">app.js</a>"));
        assert!(html.contains("<a href=\"stale\">stale@</a>"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_listing_escapes_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("<script>.txt"), b"").unwrap();

        let html = render(dir.path(), "/").await.unwrap();
        assert!(html.contains("&lt;script&gt;.txt"));
        assert!(!html.contains("<script>"));
    }
}
