//! JWT issuance and verification (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::config::JwtConfig;
use crate::error::IdentityError;
use crate::models::{Credential, IssuedToken, TokenClaims};

/// Role claim granted to administrators. Takes the place of the raw role
/// name; the two never appear together.
pub const ADMIN_CLAIM: &str = "Admin";

/// Issues and verifies signed bearer tokens.
///
/// Tokens are self-contained: no revocation list is kept, and re-issuing does
/// not invalidate prior tokens before their expiry. Short lifetimes bound the
/// exposure.
#[derive(Clone)]
pub struct TokenIssuer {
    config: JwtConfig,
}

impl TokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Mints a token for an authenticated credential.
    ///
    /// Expiry is issue time plus the configured minutes.
    pub fn issue(&self, credential: &Credential) -> Result<IssuedToken, IdentityError> {
        let expires_at = Utc::now() + Duration::minutes(self.config.expiry_minutes);
        let claims = TokenClaims {
            sub: credential.identity_id.to_string(),
            name: credential.display_name.clone(),
            email: credential.email.clone(),
            role: if credential.is_admin {
                ADMIN_CLAIM.to_string()
            } else {
                credential.role_name.clone()
            },
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.key.as_bytes()),
        )
        .map_err(|e| IdentityError::Token(e.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies a bearer token, returning the claims on success.
    ///
    /// Signature, issuer, audience, and expiry all have to hold; a token
    /// failing any single check is rejected.
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.key.as_bytes()),
            &validation,
        )
        .ok()
        .map(|data| data.claims)
    }
}
