//! Document protocol support
//!
//! The protocol engine adapter, protocol constants and the multi-status
//! rewriting used by the quota reporter.

pub mod engine;
pub mod multistatus;
pub mod responses;

pub use engine::DavEngine;
pub use multistatus::{detect_dav_prefix, inject_quota};
