//! Permission and role models, plus the layered access-resolution chain

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An atomic capability token, named `action:resource` (e.g. `edit:tickets`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub is_system: bool,
}

/// A role grouping permissions. System roles are seeded at install time and
/// are permission-editable but never renameable or deletable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub is_system: bool,
    pub permissions: Vec<String>,
}

/// Which layer of the override chain produced an access decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessSource {
    UserOverride,
    RoleOverride,
    Default,
}

/// Result of resolving page or feature access for a user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessDecision {
    pub enabled: bool,
    pub source: AccessSource,
}

/// Resolve page/feature access through the override chain: user override,
/// then role override, then the page/feature default. The first layer with
/// an explicit value wins; booleans are never merged across layers.
pub fn resolve_access(
    user_override: Option<bool>,
    role_override: Option<bool>,
    default_enabled: bool,
) -> AccessDecision {
    let layers = [
        (user_override, AccessSource::UserOverride),
        (role_override, AccessSource::RoleOverride),
        (Some(default_enabled), AccessSource::Default),
    ];

    for (value, source) in layers {
        if let Some(enabled) = value {
            return AccessDecision { enabled, source };
        }
    }

    // The default layer above is always Some
    unreachable!("access chain always terminates at the default layer")
}

/// Compute a user's effective flat permission set.
///
/// When `custom_permissions` is set it fully replaces role-derived
/// permissions (override, not merge) and role membership is ignored.
/// Otherwise the result is the union of the primary and any additional
/// roles' permission sets.
pub fn effective_permissions(
    custom_permissions: Option<&[String]>,
    roles: &[&Role],
) -> BTreeSet<String> {
    if let Some(custom) = custom_permissions {
        return custom.iter().cloned().collect();
    }

    roles
        .iter()
        .flat_map(|role| role.permissions.iter().cloned())
        .collect()
}

/// Names of the roles seeded at install time
pub const SYSTEM_ROLE_NAMES: [&str; 4] = ["Admin", "Supervisor", "Agent", "Viewer"];

/// Default permission grants for system roles.
///
/// This table exists only to seed the store at install time; runtime code
/// always reads the store so there is a single source of truth.
pub fn default_role_permissions() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (
            "Admin",
            vec![
                "view:tickets",
                "create:tickets",
                "edit:tickets",
                "assign:tickets",
                "view:users",
                "edit:users",
                "view:roles",
                "edit:roles",
                "view:routing",
                "edit:routing",
                "view:fields",
                "edit:fields",
                "view:categories",
                "edit:categories",
                "view:access",
                "edit:access",
            ],
        ),
        (
            "Supervisor",
            vec![
                "view:tickets",
                "create:tickets",
                "edit:tickets",
                "assign:tickets",
                "view:users",
                "view:routing",
                "view:fields",
                "view:categories",
            ],
        ),
        (
            "Agent",
            vec!["view:tickets", "create:tickets", "edit:tickets"],
        ),
        ("Viewer", vec!["view:tickets"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str, perms: &[&str]) -> Role {
        Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_system: false,
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn user_override_wins_over_role_and_default() {
        let decision = resolve_access(Some(false), Some(true), true);
        assert!(!decision.enabled);
        assert_eq!(decision.source, AccessSource::UserOverride);
    }

    #[test]
    fn role_override_wins_over_default() {
        let decision = resolve_access(None, Some(true), false);
        assert!(decision.enabled);
        assert_eq!(decision.source, AccessSource::RoleOverride);
    }

    #[test]
    fn falls_through_to_default() {
        let decision = resolve_access(None, None, true);
        assert!(decision.enabled);
        assert_eq!(decision.source, AccessSource::Default);
    }

    #[test]
    fn custom_permissions_replace_roles_entirely() {
        let admin = role("Admin", &["edit:tickets", "edit:roles"]);
        let custom = vec!["view:tickets".to_string()];

        let effective = effective_permissions(Some(&custom), &[&admin]);

        assert!(effective.contains("view:tickets"));
        assert!(!effective.contains("edit:tickets"));
        assert!(!effective.contains("edit:roles"));
    }

    #[test]
    fn roles_union_when_no_custom_permissions() {
        let primary = role("Agent", &["view:tickets", "edit:tickets"]);
        let secondary = role("Reports", &["view:reports"]);

        let effective = effective_permissions(None, &[&primary, &secondary]);

        assert!(effective.contains("view:tickets"));
        assert!(effective.contains("edit:tickets"));
        assert!(effective.contains("view:reports"));
    }
}
