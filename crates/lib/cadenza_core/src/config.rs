//! Process-wide configuration.
//!
//! Constructed once at startup and passed into component constructors; never
//! ambient mutable state, no hot reload.

/// Symmetric signing configuration for bearer tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC signing key.
    pub key: String,
    /// Expected `iss` claim.
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Token lifetime in minutes.
    pub expiry_minutes: i64,
}

impl JwtConfig {
    /// Reads signing configuration from environment variables.
    ///
    /// | Variable             | Default                                      |
    /// |----------------------|----------------------------------------------|
    /// | `JWT_KEY`            | dev-only key, change in production           |
    /// | `JWT_ISSUER`         | `cadenza`                                    |
    /// | `JWT_AUDIENCE`       | `cadenza-spa`                                |
    /// | `JWT_EXPIRY_MINUTES` | `60`                                         |
    pub fn from_env() -> Self {
        Self {
            key: std::env::var("JWT_KEY")
                .unwrap_or_else(|_| "cadenza-dev-signing-key-change-in-production".into()),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "cadenza".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "cadenza-spa".into()),
            expiry_minutes: std::env::var("JWT_EXPIRY_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}
