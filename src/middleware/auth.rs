//! Auth gate
//!
//! Every request must carry basic credentials that the credential store
//! accepts. There is no session caching: each request pays for a full hash
//! verification, which runs on the blocking pool.

use axum::extract::{Request, State};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use std::sync::Arc;

use crate::auth::{BasicCredentials, CredentialStore, extract_basic_credentials};

#[derive(Clone)]
pub struct AuthGate {
    store: Arc<CredentialStore>,
    challenge: HeaderValue,
}

impl AuthGate {
    /// Falls back to a realm-less challenge if `realm` cannot be sent in a header.
    pub fn new(store: Arc<CredentialStore>, realm: &str) -> Self {
        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm))
            .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
        Self { store, challenge }
    }

    async fn verify(&self, creds: BasicCredentials) -> bool {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.authenticate(&creds.username, &creds.password))
            .await
            .unwrap_or_else(|e| {
                error!("Authentication task failed: {}", e);
                false
            })
    }

    fn unauthorized(&self) -> Response {
        let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized\n").into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, self.challenge.clone());
        response
    }
}

pub async fn auth_gate(State(gate): State<AuthGate>, req: Request, next: Next) -> Response {
    let Some(creds) = extract_basic_credentials(req.headers()) else {
        return gate.unauthorized();
    };

    let username = creds.username.clone();
    if !gate.verify(creds).await {
        warn!("Auth failed for user: {}", username);
        return gate.unauthorized();
    }

    next.run(req).await
}
