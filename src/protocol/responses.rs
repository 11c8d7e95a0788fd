//! Protocol constants
//!
//! Method names, status codes and header values the middleware recognises.

use axum::http::{Method, StatusCode};

/// The list-properties verb
pub const PROPFIND: &str = "PROPFIND";

/// Success status of a properties listing
pub const MULTI_STATUS: StatusCode = StatusCode::MULTI_STATUS;

/// Content type applied to a rewritten listing when the engine set none
pub const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Path of the share root
pub const SHARE_ROOT: &str = "/";

/// Whether `method` is the list-properties verb.
pub fn is_propfind(method: &Method) -> bool {
    method.as_str() == PROPFIND
}
