//! Secret handling utilities.
//!
//! Re-exports secrecy types and the redaction marker used in debug output.

pub use secrecy::{ExposeSecret, SecretString};

/// Printed in place of a secret value.
pub const REDACTED: &str = "[REDACTED]";

/// Redaction marker for an optional secret, keeping "unset" visible.
pub fn redact_opt(secret: Option<&SecretString>) -> Option<&'static str> {
    secret.map(|_| REDACTED)
}
