//! Pure assembly of dashboard rows.
//!
//! Kept free of datastore types so the grouping pass is testable against
//! plain in-memory rows.

use std::collections::HashMap;

use crate::models::{ContentSummary, Credential, IdentityDashboard};

/// Role name that marks an administrator.
pub const ADMIN_ROLE_NAME: &str = "Administrador";

/// One decoded row of the outer-joined identity/content summary.
///
/// `item` is `None` for identities that have published nothing; the join
/// pads those with a NULL content id.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub identity_id: i32,
    pub display_name: String,
    pub family_name: Option<String>,
    pub email: String,
    pub role_name: String,
    pub item: Option<ContentSummary>,
}

/// Groups joined summary rows by identity, preserving first-seen order.
///
/// Duplicate identities collapse into a single entry; identities whose rows
/// carry no content end up with an empty item list. The admin flag is
/// recomputed here from the role name, since the join does not carry the
/// server-computed flag.
pub fn group_by_identity(rows: impl IntoIterator<Item = SummaryRow>) -> Vec<IdentityDashboard> {
    let mut order: Vec<i32> = Vec::new();
    let mut by_id: HashMap<i32, IdentityDashboard> = HashMap::new();

    for row in rows {
        let entry = by_id.entry(row.identity_id).or_insert_with(|| {
            order.push(row.identity_id);
            IdentityDashboard {
                identity: Credential {
                    identity_id: row.identity_id,
                    display_name: row.display_name.clone(),
                    family_name: row.family_name.clone(),
                    email: row.email.clone(),
                    is_admin: row.role_name.eq_ignore_ascii_case(ADMIN_ROLE_NAME),
                    role_name: row.role_name.clone(),
                },
                items: Vec::new(),
            }
        });
        if let Some(item) = row.item {
            entry.items.push(item);
        }
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;

    fn row(identity_id: i32, name: &str, role: &str, item: Option<ContentSummary>) -> SummaryRow {
        SummaryRow {
            identity_id,
            display_name: name.into(),
            family_name: None,
            email: format!("{}@example.com", name.to_lowercase()),
            role_name: role.into(),
            item,
        }
    }

    fn song(content_id: i32, title: &str) -> ContentSummary {
        ContentSummary {
            content_id,
            title: title.into(),
            description: None,
            total_views: 1_000,
            amount_earned: Decimal::new(1250, 2),
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            active: true,
        }
    }

    #[test]
    fn groups_in_first_seen_order_with_empty_entries() {
        let rows = vec![
            row(1, "Ana", "Artista", Some(song(10, "Primera"))),
            row(1, "Ana", "Artista", Some(song(11, "Segunda"))),
            row(2, "Bruno", "Artista", None),
        ];

        let entries = group_by_identity(rows);

        assert_eq!(2, entries.len());
        assert_eq!(1, entries[0].identity.identity_id);
        assert_eq!(vec![10, 11], entries[0].items.iter().map(|c| c.content_id).collect::<Vec<_>>());
        assert_eq!(2, entries[1].identity.identity_id);
        assert!(entries[1].items.is_empty());
    }

    #[test]
    fn interleaved_rows_do_not_duplicate_identities() {
        let rows = vec![
            row(1, "Ana", "Artista", Some(song(10, "Primera"))),
            row(2, "Bruno", "Artista", Some(song(20, "Otra"))),
            row(1, "Ana", "Artista", Some(song(11, "Segunda"))),
        ];

        let entries = group_by_identity(rows);

        assert_eq!(2, entries.len());
        assert_eq!(1, entries[0].identity.identity_id);
        assert_eq!(2, entries[0].items.len());
        assert_eq!(2, entries[1].identity.identity_id);
    }

    #[test]
    fn admin_flag_is_recomputed_from_role_name() {
        let rows = vec![
            row(1, "Ana", "administrador", None),
            row(2, "Bruno", "Artista", None),
        ];

        let entries = group_by_identity(rows);

        assert!(entries[0].identity.is_admin);
        assert!(!entries[1].identity.is_admin);
    }

    #[test]
    fn empty_input_gives_empty_dashboard() {
        assert!(group_by_identity(Vec::new()).is_empty());
    }
}
