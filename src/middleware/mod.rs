//! Server middleware
//!
//! The request pipeline in front of the protocol engine: request logging,
//! the auth gate, the content-type hint and the quota reporter.

pub mod auth;
pub mod content_type;
pub mod logging;
pub mod quota;

pub use auth::{AuthGate, auth_gate};
pub use content_type::content_type_hint;
pub use logging::log_requests;
pub use quota::{QuotaPolicy, ResponseBuffer, quota_reporter};
