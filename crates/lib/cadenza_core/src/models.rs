//! Domain models.
//!
//! Everything here is rebuilt from the datastore per request; nothing is
//! cached across requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An authenticated identity as returned to callers.
///
/// `is_admin` is computed server-side from the role name; it is never taken
/// from client input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub identity_id: i32,
    pub display_name: String,
    pub family_name: Option<String>,
    pub email: String,
    pub role_name: String,
    pub is_admin: bool,
}

/// Stored password material, read back during login.
///
/// Lives only inside the login flow. Deliberately not serializable, and its
/// `Debug` rendering redacts the contents.
#[derive(Clone)]
pub struct StoredSecret {
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
}

impl std::fmt::Debug for StoredSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSecret")
            .field("password_hash", &format_args!("bytes({})", self.password_hash.len()))
            .field("password_salt", &format_args!("bytes({})", self.password_salt.len()))
            .finish()
    }
}

/// A signed bearer token and its expiry.
///
/// Stateless: validity is entirely determined by the signature and the
/// embedded expiry, no server-side session record exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Read-only projection of a published content row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub content_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub total_views: i64,
    pub amount_earned: Decimal,
    pub published_at: DateTime<Utc>,
    pub active: bool,
}

/// Dashboard for one identity: the identity plus its published items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDashboard {
    pub identity: Credential,
    pub items: Vec<ContentSummary>,
}

/// Admin-only view over every identity. Identities without content still
/// appear, with an empty item list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDashboard {
    pub entries: Vec<IdentityDashboard>,
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: identity id (standard JWT `sub` claim).
    pub sub: String,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Single role claim: `"Admin"` for administrators, the raw role name
    /// otherwise.
    pub role: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
}
