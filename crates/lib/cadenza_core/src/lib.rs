//! # cadenza_core
//!
//! Core domain logic for Cadenza: the password-credential lifecycle, bearer
//! token issuance, the stored-procedure execution protocol, and the identity
//! service that composes them.

pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod procedure;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
