//! Input validation utilities
//!
//! Provides input validation for user-supplied identifiers.

/// Validate a username for the credential store.
///
/// Rejects empty names, names containing `:` (unrepresentable in the basic
/// credential scheme) and names containing control characters.
pub fn is_valid_username(input: &str) -> bool {
    !input.trim().is_empty() && !input.contains(':') && !input.chars().any(char::is_control)
}
