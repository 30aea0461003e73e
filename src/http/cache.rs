//! HTTP cache validation module
//!
//! Provides `Last-Modified` formatting and `If-Modified-Since` evaluation.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a modification time as an HTTP date
pub fn format_http_date(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date header value
///
/// Returns `None` for anything that is not a valid RFC 2822 style date.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Check whether the client's copy is still fresh
///
/// HTTP dates carry whole seconds only, so the file time is truncated
/// before comparing.
///
/// # Arguments
/// * `if_modified_since` - Client-sent If-Modified-Since header
/// * `modified` - File modification time
///
/// # Returns
/// Returns true if the file has not changed (should return 304)
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    let modified: DateTime<Utc> = modified.into();
    modified.timestamp() <= since.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(
            format_http_date(at(784_111_777)),
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let parsed = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(parsed.timestamp(), 784_111_777);
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_not_modified_since() {
        let header = "Sun, 06 Nov 1994 08:49:37 GMT";
        assert!(not_modified_since(Some(header), at(784_111_777)));
        assert!(not_modified_since(
            Some(header),
            at(784_111_777) + Duration::from_millis(400)
        ));
        assert!(not_modified_since(Some(header), at(784_111_000)));
        assert!(!not_modified_since(Some(header), at(784_111_778)));
        assert!(!not_modified_since(None, at(0)));
        assert!(!not_modified_since(Some("garbage"), at(0)));
    }
}
