//! Multi-status body rewriting
//!
//! Injects `quota-available-bytes` and `quota-used-bytes` into a properties
//! listing. The namespace prefix bound to `DAV:` is taken from the body so the
//! new elements match what the client already sees; the elements are spliced
//! in front of the first closing tag whose name ends in `prop`.

use regex::bytes::Regex;
use std::sync::LazyLock;

use crate::storage::Usage;

/// Prefix used when the body declares none for `DAV:`
pub const DEFAULT_DAV_PREFIX: &str = "D";

static DAV_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"xmlns:([a-zA-Z0-9_]+)\s*=\s*(?:"DAV:"|'DAV:')"#).expect("valid namespace regex")
});

static PROP_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</[a-zA-Z0-9_:]*prop\s*>").expect("valid closing-tag regex"));

/// The prefix the body binds to `DAV:`, or [`DEFAULT_DAV_PREFIX`].
pub fn detect_dav_prefix(body: &[u8]) -> String {
    DAV_PREFIX
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .unwrap_or_else(|| DEFAULT_DAV_PREFIX.to_string())
}

/// The two quota elements under `prefix`.
pub fn quota_elements(prefix: &str, usage: Usage) -> String {
    format!(
        "<{p}:quota-available-bytes>{free}</{p}:quota-available-bytes>\
         <{p}:quota-used-bytes>{used}</{p}:quota-used-bytes>",
        p = prefix,
        free = usage.free_bytes,
        used = usage.used_bytes,
    )
}

/// Returns the rewritten body, or `None` when no closing `prop` tag exists.
pub fn inject_quota(body: &[u8], usage: Usage) -> Option<Vec<u8>> {
    let at = PROP_CLOSE.find(body)?.start();
    let elements = quota_elements(&detect_dav_prefix(body), usage);

    let mut out = Vec::with_capacity(body.len() + elements.len());
    out.extend_from_slice(&body[..at]);
    out.extend_from_slice(elements.as_bytes());
    out.extend_from_slice(&body[at..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USAGE: Usage = Usage {
        free_bytes: 6,
        used_bytes: 4,
    };

    #[test]
    fn test_detects_declared_prefix() {
        let body = br#"<?xml version="1.0"?><x:multistatus xmlns:x="DAV:"></x:multistatus>"#;
        assert_eq!(detect_dav_prefix(body), "x");
    }

    #[test]
    fn test_single_quoted_declaration() {
        let body = br#"<d:multistatus xmlns:d='DAV:'/>"#;
        assert_eq!(detect_dav_prefix(body), "d");
    }

    #[test]
    fn test_ignores_other_namespaces() {
        let body = br#"<D:multistatus xmlns:ns0="urn:other" xmlns="DAV:"/>"#;
        assert_eq!(detect_dav_prefix(body), DEFAULT_DAV_PREFIX);
    }

    #[test]
    fn test_injects_before_first_closing_prop() {
        let body = br#"<D:multistatus xmlns:D="DAV:"><D:response><D:propstat><D:prop><D:displayname>a</D:displayname></D:prop></D:propstat></D:response><D:response><D:propstat><D:prop></D:prop></D:propstat></D:response></D:multistatus>"#;
        let out = String::from_utf8(inject_quota(body, USAGE).unwrap()).unwrap();

        assert!(out.contains(
            "<D:displayname>a</D:displayname><D:quota-available-bytes>6</D:quota-available-bytes><D:quota-used-bytes>4</D:quota-used-bytes></D:prop>"
        ));
        assert_eq!(out.matches("quota-available-bytes>").count(), 2);
    }

    #[test]
    fn test_uses_detected_prefix() {
        let body = br#"<x:multistatus xmlns:x="DAV:"><x:response><x:propstat><x:prop></x:prop></x:propstat></x:response></x:multistatus>"#;
        let out = String::from_utf8(inject_quota(body, USAGE).unwrap()).unwrap();

        assert!(out.contains("<x:quota-available-bytes>6</x:quota-available-bytes>"));
        assert!(out.contains("<x:quota-used-bytes>4</x:quota-used-bytes>"));
    }

    #[test]
    fn test_unprefixed_closing_tag() {
        let body = br#"<multistatus xmlns="DAV:"><response><propstat><prop></prop></propstat></response></multistatus>"#;
        let out = String::from_utf8(inject_quota(body, USAGE).unwrap()).unwrap();
        assert!(out.contains("<D:quota-used-bytes>4</D:quota-used-bytes></prop>"));
    }

    #[test]
    fn test_no_prop_means_no_rewrite() {
        let body = br#"<D:multistatus xmlns:D="DAV:"><D:response><D:status>HTTP/1.1 404</D:status></D:response></D:multistatus>"#;
        assert!(inject_quota(body, USAGE).is_none());
    }

    #[test]
    fn test_propstat_close_is_not_a_prop_close() {
        let body = br#"<D:propstat></D:propstat><D:prop></D:prop>"#;
        let out = String::from_utf8(inject_quota(body, USAGE).unwrap()).unwrap();
        assert!(out.starts_with("<D:propstat></D:propstat><D:prop><D:quota-available-bytes>"));
    }

    #[test]
    fn test_non_utf8_body_is_preserved() {
        let mut body = b"<D:prop>".to_vec();
        body.push(0xff);
        body.extend_from_slice(b"</D:prop>");

        let out = inject_quota(&body, USAGE).unwrap();
        assert_eq!(out[8], 0xff);
        assert!(out.ends_with(b"</D:quota-used-bytes></D:prop>"));
    }
}
