//! Tests for permission resolution
//!
//! Covers the layered page/feature override chain and the
//! custom-permissions-over-roles contract for flat permissions

use shared::{effective_permissions, resolve_access, AccessSource, Role};
use uuid::Uuid;

fn role(name: &str, perms: &[&str]) -> Role {
    Role {
        id: Uuid::new_v4(),
        name: name.to_string(),
        is_system: false,
        permissions: perms.iter().map(|p| p.to_string()).collect(),
    }
}

// ============================================================================
// Override Chain Precedence
// ============================================================================

mod override_chain {
    use super::*;

    #[test]
    fn user_override_beats_role_override_and_default() {
        let decision = resolve_access(Some(false), Some(true), true);

        assert!(!decision.enabled);
        assert_eq!(decision.source, AccessSource::UserOverride);
    }

    #[test]
    fn role_override_beats_default() {
        let decision = resolve_access(None, Some(false), true);

        assert!(!decision.enabled);
        assert_eq!(decision.source, AccessSource::RoleOverride);
    }

    #[test]
    fn no_overrides_fall_through_to_default() {
        let enabled = resolve_access(None, None, true);
        assert!(enabled.enabled);
        assert_eq!(enabled.source, AccessSource::Default);

        let disabled = resolve_access(None, None, false);
        assert!(!disabled.enabled);
        assert_eq!(disabled.source, AccessSource::Default);
    }

    #[test]
    fn levels_never_merge() {
        // A user-level grant stands even when role and default both deny
        let decision = resolve_access(Some(true), Some(false), false);

        assert!(decision.enabled);
        assert_eq!(decision.source, AccessSource::UserOverride);
    }

    #[test]
    fn removing_a_role_override_reverts_to_the_page_default() {
        let with_override = resolve_access(None, Some(false), true);
        assert!(!with_override.enabled);

        // The same resolution after the override row is deleted
        let without_override = resolve_access(None, None, true);
        assert!(without_override.enabled);
        assert_eq!(without_override.source, AccessSource::Default);
    }
}

// ============================================================================
// Custom Permissions Replace Roles
// ============================================================================

mod custom_permissions {
    use super::*;

    #[test]
    fn custom_set_is_sole_source_of_truth() {
        let admin = role("Admin", &["edit:tickets", "edit:roles", "edit:users"]);
        let custom = vec!["view:tickets".to_string()];

        let effective = effective_permissions(Some(&custom), &[&admin]);

        assert_eq!(effective.len(), 1);
        assert!(effective.contains("view:tickets"));
    }

    #[test]
    fn changing_role_does_not_change_custom_results() {
        let custom = vec!["view:tickets".to_string(), "edit:tickets".to_string()];

        let as_viewer = effective_permissions(Some(&custom), &[&role("Viewer", &["view:tickets"])]);
        let as_admin = effective_permissions(Some(&custom), &[&role("Admin", &["edit:roles"])]);
        let with_no_roles = effective_permissions(Some(&custom), &[]);

        assert_eq!(as_viewer, as_admin);
        assert_eq!(as_admin, with_no_roles);
    }

    #[test]
    fn empty_custom_set_denies_everything() {
        let admin = role("Admin", &["edit:tickets"]);
        let custom: Vec<String> = vec![];

        let effective = effective_permissions(Some(&custom), &[&admin]);

        assert!(effective.is_empty());
    }

    #[test]
    fn null_custom_set_unions_primary_and_secondary_roles() {
        let primary = role("Agent", &["view:tickets", "edit:tickets"]);
        let secondary = role("Exports", &["view:tickets", "export:reports"]);

        let effective = effective_permissions(None, &[&primary, &secondary]);

        assert_eq!(effective.len(), 3);
        assert!(effective.contains("view:tickets"));
        assert!(effective.contains("edit:tickets"));
        assert!(effective.contains("export:reports"));
    }
}
