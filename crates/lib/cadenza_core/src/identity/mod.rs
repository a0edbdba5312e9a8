//! Identity orchestration: registration, login, and dashboard assembly.
//!
//! Every operation is single-shot: identity state is re-read from the
//! datastore per request, nothing is cached across calls.

mod assemble;

pub use assemble::{ADMIN_ROLE_NAME, SummaryRow, group_by_identity};

use chrono::Utc;
use tracing::{error, warn};

use crate::auth::jwt::TokenIssuer;
use crate::auth::password;
use crate::error::IdentityError;
use crate::models::{
    ContentSummary, Credential, GlobalDashboard, IdentityDashboard, IssuedToken, StoredSecret,
};
use crate::procedure::{ProcArgs, ProcRow, ProcedureError, ProcedureExecutor, ProcedureOutcome};

/// Role granted to new registrations.
pub const DEFAULT_ROLE_NAME: &str = "Artista";

// Procedure names are the fixed datastore contract.
const PROC_ROLE_BY_NAME: &str = "seg.procCatRolesConPorNombre";
const PROC_IDENTITY_INSERT: &str = "seg.procCatUsuariosIns";
const PROC_IDENTITY_BY_ID: &str = "seg.procCatUsuariosConPorId";
const PROC_IDENTITY_LOGIN: &str = "seg.procCatUsuariosConLogin";
const PROC_LAST_ACCESS: &str = "seg.procCatUsuariosActUltimoAcceso";
const PROC_CONTENT_BY_OWNER: &str = "seg.procOpCancionesConPorUsuario";
const PROC_CONTENT_SUMMARY: &str = "seg.procOpCancionesConResumen";

/// Registration input, validated at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct RegisterIdentity {
    pub display_name: String,
    pub family_name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Successful operation: the user-facing message plus the payload.
#[derive(Debug)]
pub struct Granted<T> {
    pub message: String,
    pub payload: T,
}

/// Result alias for identity operations.
pub type ServiceResult<T> = Result<Granted<T>, IdentityError>;

struct RoleInfo {
    role_id: i32,
}

struct IdentityWithSecret {
    credential: Credential,
    secret: StoredSecret,
}

/// Orchestrates registration, login, and dashboards by composing procedure
/// calls, the credential hasher, and the token issuer.
pub struct IdentityService {
    executor: ProcedureExecutor,
    tokens: TokenIssuer,
}

impl IdentityService {
    pub fn new(executor: ProcedureExecutor, tokens: TokenIssuer) -> Self {
        Self { executor, tokens }
    }

    /// Registers a new identity under the default role and mints a token.
    ///
    /// The inserted row is re-read by id before issuing the token; echoed
    /// insert data is not trusted. A failed re-read after a reported insert
    /// is an inconsistency, not a user error.
    pub async fn register(&self, request: RegisterIdentity) -> ServiceResult<IssuedToken> {
        let role = self.role_by_name(DEFAULT_ROLE_NAME).await?;

        let salt = password::generate_salt();
        let hash = password::derive(&request.password, &salt);
        let email = normalize_email(&request.email);

        let ProcedureOutcome {
            succeeded,
            message,
            payload,
        } = self
            .executor
            .execute_returning(
                PROC_IDENTITY_INSERT,
                ProcArgs::new()
                    .int(role.role_id)
                    .text(&request.display_name)
                    .opt_text(request.family_name.clone())
                    .text(&email)
                    .bytes(hash.to_vec())
                    .bytes(salt.to_vec()),
                |row| Ok(row.int("UsuarioId")?),
            )
            .await;

        let Some(new_id) = payload.filter(|_| succeeded) else {
            warn!(email = %email, message = %message, "registration rejected");
            return Err(IdentityError::Persistence(message));
        };

        let identity = match self.identity_by_id(new_id).await {
            Ok(credential) => credential,
            Err(e) => {
                error!(
                    email = %email,
                    identity_id = new_id,
                    error = %e,
                    "identity was created but could not be read back"
                );
                return Err(IdentityError::Inconsistent(e.to_string()));
            }
        };

        let token = self.tokens.issue(&identity)?;
        Ok(Granted {
            message,
            payload: token,
        })
    }

    /// Authenticates an identity by email and password.
    ///
    /// An unknown email and a wrong password produce the same rejection;
    /// the last-access update is best effort and never fails the login.
    pub async fn login(&self, email: &str, password_input: &str) -> ServiceResult<IssuedToken> {
        let email = normalize_email(email);

        let ProcedureOutcome {
            succeeded,
            message,
            payload,
        } = self
            .executor
            .fetch_optional(PROC_IDENTITY_LOGIN, ProcArgs::new().text(&email), |row| {
                Ok(IdentityWithSecret {
                    credential: decode_credential(row)?,
                    secret: StoredSecret {
                        password_hash: row.bytes("PasswordHash")?,
                        password_salt: row.bytes("PasswordSalt")?,
                    },
                })
            })
            .await;

        let Some(found) = payload.flatten().filter(|_| succeeded) else {
            warn!(email = %email, message = %message, "login attempt for unknown or rejected account");
            return Err(IdentityError::InvalidCredentials);
        };

        check_admin_contract(&found.credential);

        if !password::verify(
            password_input,
            &found.secret.password_salt,
            &found.secret.password_hash,
        ) {
            warn!(email = %email, "login attempt with wrong password");
            return Err(IdentityError::InvalidCredentials);
        }

        let touch = self
            .executor
            .execute(
                PROC_LAST_ACCESS,
                ProcArgs::new()
                    .int(found.credential.identity_id)
                    .timestamp(Utc::now()),
            )
            .await;
        if !touch.succeeded {
            warn!(
                identity_id = found.credential.identity_id,
                message = %touch.message,
                "last-access update failed"
            );
        }

        let token = self.tokens.issue(&found.credential)?;
        Ok(Granted {
            message: "Inicio de sesión exitoso.".into(),
            payload: token,
        })
    }

    /// Builds the dashboard for one identity.
    pub async fn dashboard(&self, identity_id: i32) -> ServiceResult<IdentityDashboard> {
        let identity = self.identity_by_id(identity_id).await.map_err(|e| {
            warn!(identity_id, error = %e, "identity lookup for dashboard failed");
            e
        })?;

        let ProcedureOutcome {
            succeeded,
            message,
            payload,
        } = self
            .executor
            .fetch_all(
                PROC_CONTENT_BY_OWNER,
                ProcArgs::new().int(identity_id),
                decode_content_summary,
            )
            .await;

        let Some(items) = payload.filter(|_| succeeded) else {
            warn!(identity_id, message = %message, "owned content lookup failed");
            return Err(IdentityError::Persistence(message));
        };

        Ok(Granted {
            message: "Información de usuario recuperada correctamente.".into(),
            payload: IdentityDashboard { identity, items },
        })
    }

    /// Builds the global dashboard from the outer-joined summary set.
    ///
    /// Rows with a NULL identity id are skipped; grouping preserves the
    /// first-seen order of identities.
    pub async fn global_dashboard(&self) -> ServiceResult<GlobalDashboard> {
        let ProcedureOutcome {
            succeeded,
            message,
            payload,
        } = self
            .executor
            .fetch_all(PROC_CONTENT_SUMMARY, ProcArgs::new(), decode_summary_row)
            .await;

        let Some(rows) = payload.filter(|_| succeeded) else {
            warn!(message = %message, "global dashboard query failed");
            return Err(IdentityError::Persistence(message));
        };

        let entries = group_by_identity(rows.into_iter().flatten());
        Ok(Granted {
            message: fallback(message, "Resumen global recuperado correctamente."),
            payload: GlobalDashboard { entries },
        })
    }

    async fn role_by_name(&self, name: &str) -> Result<RoleInfo, IdentityError> {
        let ProcedureOutcome {
            succeeded,
            message,
            payload,
        } = self
            .executor
            .fetch_optional(PROC_ROLE_BY_NAME, ProcArgs::new().text(name), |row| {
                Ok(RoleInfo {
                    role_id: row.int("RolId")?,
                })
            })
            .await;

        if !succeeded {
            return Err(IdentityError::Persistence(message));
        }
        payload.flatten().ok_or_else(|| {
            IdentityError::NotFound(fallback(message, "No se encontró el rol solicitado."))
        })
    }

    async fn identity_by_id(&self, identity_id: i32) -> Result<Credential, IdentityError> {
        let ProcedureOutcome {
            succeeded,
            message,
            payload,
        } = self
            .executor
            .fetch_optional(
                PROC_IDENTITY_BY_ID,
                ProcArgs::new().int(identity_id),
                decode_credential,
            )
            .await;

        if !succeeded {
            return Err(IdentityError::Persistence(message));
        }
        let credential = payload.flatten().ok_or_else(|| {
            IdentityError::NotFound(fallback(message, "No se encontró el usuario."))
        })?;
        check_admin_contract(&credential);
        Ok(credential)
    }
}

/// Emails are matched after trimming and lower-casing, on both write and
/// read paths.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn fallback(message: String, default: &str) -> String {
    if message.is_empty() {
        default.to_string()
    } else {
        message
    }
}

/// The server computes `EsAdmin`; the join path derives it from the role
/// name. The two must agree; divergence is a datastore-contract bug and is
/// flagged, never silently reconciled.
fn check_admin_contract(credential: &Credential) {
    let derived = credential.role_name.eq_ignore_ascii_case(ADMIN_ROLE_NAME);
    if derived != credential.is_admin {
        warn!(
            identity_id = credential.identity_id,
            role = %credential.role_name,
            flagged = credential.is_admin,
            "server admin flag disagrees with role name"
        );
    }
}

fn decode_credential(row: &ProcRow) -> Result<Credential, ProcedureError> {
    Ok(Credential {
        identity_id: row.int("UsuarioId")?,
        display_name: row.string("Nombre")?,
        family_name: row.opt_string("Apellidos")?,
        email: row.string("Correo")?,
        role_name: row.string("RolNombre")?,
        is_admin: row.boolean("EsAdmin")?,
    })
}

fn decode_content_summary(row: &ProcRow) -> Result<ContentSummary, ProcedureError> {
    Ok(ContentSummary {
        content_id: row.int("CancionId")?,
        title: row.string("Titulo")?,
        description: row.opt_string("Descripcion")?,
        total_views: row.bigint("TotalReproducciones")?,
        amount_earned: row.decimal("MontoGanado")?,
        published_at: row.timestamp("FechaPublicacion")?,
        active: row.boolean("Activo")?,
    })
}

/// Decodes one outer-joined summary row. `None` for the padding rows the
/// join emits with a NULL identity id.
fn decode_summary_row(row: &ProcRow) -> Result<Option<SummaryRow>, ProcedureError> {
    let Some(identity_id) = row.opt_int("UsuarioId")? else {
        return Ok(None);
    };

    let item = match row.opt_int("CancionId")? {
        Some(content_id) => Some(ContentSummary {
            content_id,
            title: row.string("Titulo")?,
            // The joined projection omits descriptions and only reports
            // active content.
            description: None,
            total_views: row.bigint("TotalReproducciones")?,
            amount_earned: row.decimal("MontoGanado")?,
            published_at: row.timestamp("FechaPublicacion")?,
            active: true,
        }),
        None => None,
    };

    Ok(Some(SummaryRow {
        identity_id,
        display_name: row.string("Nombre")?,
        family_name: row.opt_string("Apellidos")?,
        email: row.string("Correo")?,
        role_name: row.string("RolNombre")?,
        item,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization_trims_and_lowercases() {
        assert_eq!("ana@example.com", normalize_email("  Ana@Example.COM "));
    }

    #[test]
    fn fallback_keeps_non_empty_messages() {
        assert_eq!("proc says hi", fallback("proc says hi".into(), "default"));
        assert_eq!("default", fallback(String::new(), "default"));
    }

    #[test]
    fn invalid_credentials_message_is_generic() {
        // Unknown account and wrong password must be indistinguishable.
        let a = IdentityError::InvalidCredentials.to_string();
        assert_eq!("Las credenciales proporcionadas no son válidas.", a);
        assert!(!a.contains("correo"));
        assert!(!a.contains("password"));
    }
}
