//! API server configuration.

use cadenza_core::config::JwtConfig;

/// Default SPA origin assumed when no CORS origins are configured.
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Configuration for the API layer.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Token signing configuration.
    pub jwt: JwtConfig,
    /// Allowed CORS origins for the SPA.
    pub cors_origins: Vec<String>,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// `CORS_ALLOWED_ORIGINS` is a comma-separated origin list; when unset
    /// the dev SPA origin is assumed and a warning is logged.
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            cors_origins: cors_origins_from_env(),
        }
    }
}

fn cors_origins_from_env() -> Vec<String> {
    let configured: Vec<String> = std::env::var("CORS_ALLOWED_ORIGINS")
        .map(|v| {
            v.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if configured.is_empty() {
        tracing::warn!(
            origin = DEFAULT_CORS_ORIGIN,
            "CORS_ALLOWED_ORIGINS not set, allowing the default dev origin"
        );
        return vec![DEFAULT_CORS_ORIGIN.to_string()];
    }
    configured
}
