use http::StatusCode;
use http::header::{self, HeaderMap};

/// Content-Type prefixes that are worth compressing.
const COMPRESSIBLE_TYPES: [&str; 4] = [
    "text/",
    "image/svg",
    "application/javascript",
    "application/x-javascript",
];

/// Decides whether a response about to be committed should be compressed.
///
/// Must be called with the headers as the handler left them, before any of
/// the rewrites applied on compression.
pub fn is_eligible(status: StatusCode, headers: &HeaderMap, min_length: u64) -> bool {
    status == StatusCode::OK
        && !is_below_min_length(headers, min_length)
        && !has_header(headers, &header::TRAILER)
        && !has_header(headers, &header::CONTENT_ENCODING)
        && is_compressible_content_type(headers)
}

/// Returns the declared Content-Length, or 0 when missing or unparseable.
pub fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Checks if Content-Length is unknown, zero, or below the minimum size.
fn is_below_min_length(headers: &HeaderMap, min_length: u64) -> bool {
    let len = content_length(headers);
    len == 0 || len < min_length
}

/// Checks for a header with a non-empty value.
fn has_header(headers: &HeaderMap, name: &header::HeaderName) -> bool {
    headers.get(name).is_some_and(|v| !v.is_empty())
}

/// Checks if the content type is on the compressible list.
fn is_compressible_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| COMPRESSIBLE_TYPES.iter().any(|p| ct.starts_with(p)))
}

/// Adds Accept-Encoding to the Vary header if not already present.
pub(crate) fn add_vary_accept_encoding(headers: &mut HeaderMap) {
    // Check all Vary headers to see if Accept-Encoding is already present
    for vary in headers.get_all(header::VARY) {
        if let Ok(vary_str) = vary.to_str() {
            let covered = vary_str.split(',').any(|v| {
                let v = v.trim();
                v == "*" || v.eq_ignore_ascii_case("accept-encoding")
            });
            if covered {
                return;
            }
        }
    }

    headers.append(
        header::VARY,
        header::HeaderValue::from_static("accept-encoding"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers<I>(pairs: I) -> HeaderMap
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name, HeaderValue::from_static(value));
        }
        map
    }

    fn eligible_headers() -> HeaderMap {
        headers([("content-type", "text/html"), ("content-length", "1000")])
    }

    #[test]
    fn test_eligible_baseline() {
        assert!(is_eligible(StatusCode::OK, &eligible_headers(), 256));
    }

    #[test]
    fn test_non_ok_status() {
        for status in [
            StatusCode::CREATED,
            StatusCode::NO_CONTENT,
            StatusCode::PARTIAL_CONTENT,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            assert!(!is_eligible(status, &eligible_headers(), 256), "{status}");
        }
    }

    #[test]
    fn test_min_length_boundary() {
        let at = headers([("content-type", "text/plain"), ("content-length", "256")]);
        let below = headers([("content-type", "text/plain"), ("content-length", "255")]);
        assert!(is_eligible(StatusCode::OK, &at, 256));
        assert!(!is_eligible(StatusCode::OK, &below, 256));
    }

    #[test]
    fn test_missing_or_zero_length() {
        let missing = headers([("content-type", "text/plain")]);
        let zero = headers([("content-type", "text/plain"), ("content-length", "0")]);
        let garbage = headers([("content-type", "text/plain"), ("content-length", "lots")]);
        for map in [&missing, &zero, &garbage] {
            assert!(!is_eligible(StatusCode::OK, map, 256));
            assert!(!is_eligible(StatusCode::OK, map, 0));
        }
    }

    #[test]
    fn test_content_types() {
        for ct in [
            "text/plain",
            "text/css; charset=utf-8",
            "image/svg+xml",
            "application/javascript",
            "application/x-javascript; charset=utf-8",
        ] {
            let map = headers([("content-type", ct), ("content-length", "1000")]);
            assert!(is_eligible(StatusCode::OK, &map, 256), "{ct}");
        }

        for ct in [
            "application/octet-stream",
            "application/json",
            "image/png",
            "Text/plain",
        ] {
            let map = headers([("content-type", ct), ("content-length", "1000")]);
            assert!(!is_eligible(StatusCode::OK, &map, 256), "{ct}");
        }

        let untyped = headers([("content-length", "1000")]);
        assert!(!is_eligible(StatusCode::OK, &untyped, 256));
    }

    #[test]
    fn test_existing_content_encoding() {
        let mut map = eligible_headers();
        map.insert(header::CONTENT_ENCODING, HeaderValue::from_static("br"));
        assert!(!is_eligible(StatusCode::OK, &map, 256));
    }

    #[test]
    fn test_empty_content_encoding_ignored() {
        let mut map = eligible_headers();
        map.insert(header::CONTENT_ENCODING, HeaderValue::from_static(""));
        assert!(is_eligible(StatusCode::OK, &map, 256));
    }

    #[test]
    fn test_trailer_header() {
        let mut map = eligible_headers();
        map.insert(header::TRAILER, HeaderValue::from_static("x-checksum"));
        assert!(!is_eligible(StatusCode::OK, &map, 256));
    }

    #[test]
    fn test_content_length() {
        assert_eq!(content_length(&headers([("content-length", "42")])), 42);
        assert_eq!(content_length(&headers([("content-length", "-1")])), 0);
        assert_eq!(content_length(&HeaderMap::new()), 0);
    }

    #[test]
    fn test_vary_header_added() {
        let mut map = HeaderMap::new();
        add_vary_accept_encoding(&mut map);
        assert_eq!(map.get(header::VARY).unwrap(), "accept-encoding");
    }

    #[test]
    fn test_vary_header_appended() {
        let mut map = headers([("vary", "origin")]);
        add_vary_accept_encoding(&mut map);

        let vary_values: Vec<_> = map
            .get_all(header::VARY)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(vary_values, vec!["origin", "accept-encoding"]);
    }

    #[test]
    fn test_vary_header_not_duplicated() {
        let mut map = headers([("vary", "Origin, Accept-Encoding")]);
        add_vary_accept_encoding(&mut map);
        assert_eq!(map.get_all(header::VARY).iter().count(), 1);
    }

    #[test]
    fn test_vary_header_star_not_modified() {
        let mut map = headers([("vary", "*")]);
        add_vary_accept_encoding(&mut map);
        assert_eq!(map.get(header::VARY).unwrap(), "*");
        assert_eq!(map.get_all(header::VARY).iter().count(), 1);
    }
}
