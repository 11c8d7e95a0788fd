//! Quota reporter
//!
//! Rewrites the properties listing of the share root so clients see
//! `quota-available-bytes` and `quota-used-bytes`. Every other request passes
//! through without buffering.
//!
//! The engine commits its headers as soon as it writes body bytes, so the
//! length header can only be corrected once the whole body is held. Memory use
//! is therefore proportional to the full root listing.

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use axum::http::response::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body_util::BodyExt;
use log::{error, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::UsageError;
use crate::protocol::inject_quota;
use crate::protocol::responses::{MULTI_STATUS, SHARE_ROOT, XML_CONTENT_TYPE, is_propfind};
use crate::storage::{DirectoryUsage, FilesystemUsage, Usage, UsageProvider};

/// Decides where the reported figures come from.
///
/// With a quota set, used bytes are the size of the data root's tree clamped
/// to the quota and free bytes are the remainder. Without one, the volume
/// holding the data root is reported as is.
pub struct QuotaPolicy {
    data_root: PathBuf,
    quota_bytes: u64,
    volume: Arc<dyn UsageProvider>,
    directory: Arc<dyn UsageProvider>,
}

impl QuotaPolicy {
    pub fn new(data_root: impl Into<PathBuf>, quota_bytes: u64) -> Self {
        Self::with_providers(
            data_root,
            quota_bytes,
            Arc::new(FilesystemUsage),
            Arc::new(DirectoryUsage),
        )
    }

    pub fn with_providers(
        data_root: impl Into<PathBuf>,
        quota_bytes: u64,
        volume: Arc<dyn UsageProvider>,
        directory: Arc<dyn UsageProvider>,
    ) -> Self {
        Self {
            data_root: data_root.into(),
            quota_bytes,
            volume,
            directory,
        }
    }

    pub fn compute(&self) -> Result<Usage, UsageError> {
        if self.quota_bytes > 0 {
            let used = self.directory.usage(&self.data_root)?.used_bytes;
            return Ok(Usage::within_quota(self.quota_bytes, used));
        }

        let absolute =
            std::path::absolute(&self.data_root).unwrap_or_else(|_| self.data_root.clone());
        self.volume.usage(&absolute)
    }
}

/// A fully buffered engine response.
pub struct ResponseBuffer {
    parts: Parts,
    body: Bytes,
}

impl ResponseBuffer {
    /// Drains the response body into memory.
    pub async fn capture(response: Response) -> Result<Self, axum::Error> {
        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(Self { parts, body })
    }

    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn replace_body(&mut self, body: Vec<u8>) {
        self.body = Bytes::from(body);
    }

    /// The response exactly as the engine produced it.
    pub fn into_passthrough(self) -> Response {
        Response::from_parts(self.parts, Body::from(self.body))
    }

    /// The response with a length header matching the held body and a
    /// content type if the engine left it unset.
    pub fn into_listing(mut self) -> Response {
        let headers = &mut self.parts.headers;
        headers.remove(TRANSFER_ENCODING);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(self.body.len()));
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
        }
        Response::from_parts(self.parts, Body::from(self.body))
    }
}

async fn current_usage(policy: Arc<QuotaPolicy>) -> Option<Usage> {
    match tokio::task::spawn_blocking(move || policy.compute()).await {
        Ok(Ok(usage)) => Some(usage),
        Ok(Err(e)) => {
            warn!("Failed to get disk usage: {}", e);
            None
        }
        Err(e) => {
            warn!("Disk usage task failed: {}", e);
            None
        }
    }
}

pub async fn quota_reporter(
    State(policy): State<Arc<QuotaPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    if !is_propfind(req.method()) || req.uri().path() != SHARE_ROOT {
        return next.run(req).await;
    }

    let mut buffer = match ResponseBuffer::capture(next.run(req).await).await {
        Ok(buffer) => buffer,
        Err(e) => {
            error!("Failed to buffer listing of {}: {}", SHARE_ROOT, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if buffer.status() != MULTI_STATUS {
        return buffer.into_passthrough();
    }

    if let Some(usage) = current_usage(policy).await {
        if let Some(body) = inject_quota(buffer.body(), usage) {
            buffer.replace_body(body);
        }
    }

    buffer.into_listing()
}
