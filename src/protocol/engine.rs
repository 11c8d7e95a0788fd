//! Protocol engine
//!
//! Adapts `dav-server`'s handler into a `tower` service serving the data root.
//! All method semantics (listing, get/put, mkcol, lock/unlock, copy/move) live
//! in the engine; the middleware in front of it only observes responses.

use axum::body::Body;
use axum::http::{Request, Response};
use dav_server::DavHandler;
use dav_server::body::Body as DavBody;
use dav_server::localfs::LocalFs;
use dav_server::memls::MemLs;
use std::convert::Infallible;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::Service;

#[derive(Clone)]
pub struct DavEngine {
    handler: DavHandler,
}

impl DavEngine {
    /// An engine over the local directory `data_root` with in-memory locks.
    pub fn new(data_root: &Path) -> Self {
        let handler = DavHandler::builder()
            .filesystem(LocalFs::new(data_root, false, false, false))
            .locksystem(MemLs::new())
            .build_handler();
        Self { handler }
    }
}

impl Service<Request<Body>> for DavEngine {
    type Response = Response<DavBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.handler.clone();
        Box::pin(async move { Ok(handler.handle(req).await) })
    }
}
