use axum::http::header::{
    CACHE_CONTROL, CONNECTION, CONTENT_ENCODING, CONTENT_TYPE, EXPIRES, PRAGMA,
};
use axum::http::{HeaderMap, HeaderValue};

pub(crate) const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream; charset=utf-8";

/// Which set of response headers a stream endpoint sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HeaderPolicy {
    Standard,
    /// Also forbids shared caches and any content encoding, for clients
    /// that otherwise buffer the whole body before showing it.
    Strict,
}

/// Headers that keep caches, proxies and compression out of a live stream.
pub(crate) fn stream_headers(policy: HeaderPolicy) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(EVENT_STREAM_CONTENT_TYPE),
    );

    let cache_control = match policy {
        HeaderPolicy::Standard => "no-cache, no-store, must-revalidate",
        HeaderPolicy::Strict => "no-cache, no-store, must-revalidate, private",
    };
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache_control));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
    headers.insert("x-proxy-buffering", HeaderValue::from_static("no"));

    if policy == HeaderPolicy::Strict {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("identity"));
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_headers_disable_caching_and_buffering() {
        let headers = stream_headers(HeaderPolicy::Standard);

        assert_eq!(headers[CONTENT_TYPE], EVENT_STREAM_CONTENT_TYPE);
        assert_eq!(headers[CACHE_CONTROL], "no-cache, no-store, must-revalidate");
        assert_eq!(headers[PRAGMA], "no-cache");
        assert_eq!(headers[EXPIRES], "0");
        assert_eq!(headers[CONNECTION], "keep-alive");
        assert_eq!(headers["x-accel-buffering"], "no");
        assert_eq!(headers["x-proxy-buffering"], "no");
        assert!(headers.get(CONTENT_ENCODING).is_none());
    }

    #[test]
    fn test_strict_headers_add_private_and_identity_encoding() {
        let headers = stream_headers(HeaderPolicy::Strict);

        assert_eq!(
            headers[CACHE_CONTROL],
            "no-cache, no-store, must-revalidate, private"
        );
        assert_eq!(headers[CONTENT_ENCODING], "identity");
    }
}
