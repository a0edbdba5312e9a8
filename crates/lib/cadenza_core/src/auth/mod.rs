//! Credential hashing and bearer-token issuance.

pub mod jwt;
pub mod password;
