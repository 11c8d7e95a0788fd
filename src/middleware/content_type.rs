//! Content-type hint
//!
//! Desktop clients rely on the server naming a file's type. Successful
//! `GET`/`HEAD` responses get the type guessed from the path's extension.

use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use std::path::Path;

/// Type guessed from the extension of `path`, if any.
pub fn guess_content_type(path: &str) -> Option<HeaderValue> {
    let ext = Path::new(path).extension()?.to_str()?;
    let mime = mime_guess::from_ext(ext).first()?;
    HeaderValue::from_str(mime.as_ref()).ok()
}

pub async fn content_type_hint(req: Request, next: Next) -> Response {
    let hint = if req.method() == Method::GET || req.method() == Method::HEAD {
        guess_content_type(req.uri().path())
    } else {
        None
    };

    let mut response = next.run(req).await;
    if let Some(value) = hint {
        if response.status().is_success() {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
    }
    response
}
