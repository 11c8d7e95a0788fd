//! Logging middleware
//!
//! Provides request logging functionality.

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use log::{error, info};

/// Files desktop clients look up in every folder they open
const PROBE_FILES: &[&str] = &["desktop.ini", "autorun.inf", "thumbs.db", "folder.jpg"];

/// Whether a 404 for `path` is routine client probing rather than a real miss.
pub fn is_desktop_lookup_miss(path: &str, status: StatusCode) -> bool {
    if status != StatusCode::NOT_FOUND {
        return false;
    }
    let name = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();
    PROBE_FILES.contains(&name.as_str())
}

/// Log a completed request
pub fn log_request(method: &Method, path: &str, status: StatusCode) {
    if is_desktop_lookup_miss(path, status) {
        return;
    }
    if status.is_server_error() {
        error!("{} {} -> {}", method, path, status);
    } else {
        info!("{} {} -> {}", method, path, status);
    }
}

pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    log_request(&method, &path, response.status());
    response
}
