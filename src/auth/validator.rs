//! Basic credential extraction
//!
//! Parses the `Authorization` header of the basic scheme into a username and
//! password. Anything that is not well-formed counts as missing credentials.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Credentials presented by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Extracts basic-scheme credentials from request headers.
pub fn extract_basic_credentials(headers: &HeaderMap) -> Option<BasicCredentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    parse_basic_credentials(value)
}

/// Parses an `Authorization` header value such as `Basic YWxpY2U6cHc=`.
pub fn parse_basic_credentials(value: &str) -> Option<BasicCredentials> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn encode(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_parses_well_formed_header() {
        let creds = parse_basic_credentials(&encode("alice:wonder:land")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "wonder:land");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let value = encode("bob:pw").replacen("Basic", "bAsIc", 1);
        assert!(parse_basic_credentials(&value).is_some());
    }

    #[test]
    fn test_empty_password_allowed() {
        let creds = parse_basic_credentials(&encode("bob:")).unwrap();
        assert_eq!(creds.password, "");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_basic_credentials("Bearer abc").is_none());
        assert!(parse_basic_credentials("Basic").is_none());
        assert!(parse_basic_credentials("Basic !!!notbase64").is_none());
        assert!(parse_basic_credentials(&encode("no-colon")).is_none());
        assert!(parse_basic_credentials(&format!("Basic {}", STANDARD.encode([0xff, 0xfe, b':']))).is_none());
    }

    #[test]
    fn test_missing_header() {
        let mut headers = HeaderMap::new();
        assert!(extract_basic_credentials(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_str(&encode("carol:pw")).unwrap());
        assert_eq!(
            extract_basic_credentials(&headers).unwrap().username,
            "carol"
        );
    }
}
