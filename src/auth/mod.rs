//! Authentication system
//!
//! Handles the credential store, password hashing and basic credential parsing.

pub mod credentials;
pub mod hashing;
pub mod validator;

pub use credentials::{CredentialStore, USERS_FILE_NAME, User};
pub use validator::{BasicCredentials, extract_basic_credentials};
