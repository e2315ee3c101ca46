//! Tests for intake field visibility resolution
//!
//! Covers the two-mode behavior (category absent vs. selected), the
//! fail-closed default once a category is chosen, and the unhideable core
//! fields

use shared::{
    missing_required_fields, resolve_fields, CategoryFieldOverride, DepartmentType,
    FieldConfiguration, FieldVisibility, ResolvedField, CORE_FIELDS,
};
use std::collections::HashMap;
use uuid::Uuid;

fn config(name: &str, enabled: bool, required: bool, dept: DepartmentType) -> FieldConfiguration {
    FieldConfiguration {
        field_name: name.to_string(),
        field_label: name.to_string(),
        is_enabled: enabled,
        is_required: required,
        display_order: 0,
        department_type: dept,
    }
}

fn override_row(
    category_id: Uuid,
    name: &str,
    visibility: Option<FieldVisibility>,
    required: Option<bool>,
) -> CategoryFieldOverride {
    CategoryFieldOverride {
        category_id,
        field_name: name.to_string(),
        visibility_override: visibility,
        required_override: required,
    }
}

fn find<'a>(fields: &'a [ResolvedField], name: &str) -> &'a ResolvedField {
    fields
        .iter()
        .find(|f| f.field_name == name)
        .unwrap_or_else(|| panic!("field {} missing from resolution", name))
}

// ============================================================================
// Category Absent: department-type defaults
// ============================================================================

mod category_absent {
    use super::*;

    #[test]
    fn department_scoped_fields_filter_by_requester_type() {
        let configs = vec![
            config("order_id", true, false, DepartmentType::SellerSupport),
            config("app_version", true, false, DepartmentType::CustomerSupport),
            config("attachment_url", true, false, DepartmentType::All),
        ];

        let seller = resolve_fields(DepartmentType::SellerSupport, None, &configs);
        assert!(find(&seller, "order_id").visible);
        assert!(!find(&seller, "app_version").visible);
        assert!(find(&seller, "attachment_url").visible);

        let customer = resolve_fields(DepartmentType::CustomerSupport, None, &configs);
        assert!(!find(&customer, "order_id").visible);
        assert!(find(&customer, "app_version").visible);
    }

    #[test]
    fn disabled_fields_stay_hidden() {
        let configs = vec![config("order_id", false, false, DepartmentType::All)];
        let fields = resolve_fields(DepartmentType::All, None, &configs);

        assert!(!find(&fields, "order_id").visible);
    }

    #[test]
    fn required_flag_comes_from_base_config() {
        let configs = vec![config("order_id", true, true, DepartmentType::All)];
        let fields = resolve_fields(DepartmentType::All, None, &configs);

        assert!(find(&fields, "order_id").required);
    }
}

// ============================================================================
// Category Selected: fail-closed overrides
// ============================================================================

mod category_selected {
    use super::*;

    #[test]
    fn field_without_override_row_is_hidden_even_when_enabled() {
        let category = Uuid::new_v4();
        let configs = vec![config("order_id", true, false, DepartmentType::All)];
        let overrides = vec![override_row(category, "attachment_url", None, None)];

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);

        assert!(!find(&fields, "order_id").visible);
    }

    #[test]
    fn the_default_flips_the_instant_a_category_is_chosen() {
        let configs = vec![config("order_id", true, false, DepartmentType::All)];

        let before = resolve_fields(DepartmentType::All, None, &configs);
        assert!(find(&before, "order_id").visible);

        // Same configuration, empty override set: now hidden
        let after = resolve_fields(DepartmentType::All, Some(&[]), &configs);
        assert!(!find(&after, "order_id").visible);
    }

    #[test]
    fn override_row_with_no_visibility_value_means_visible() {
        let category = Uuid::new_v4();
        let configs = vec![config("order_id", true, false, DepartmentType::All)];
        let overrides = vec![override_row(category, "order_id", None, None)];

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);

        assert!(find(&fields, "order_id").visible);
    }

    #[test]
    fn explicit_hidden_override_hides() {
        let category = Uuid::new_v4();
        let configs = vec![config("order_id", true, false, DepartmentType::All)];
        let overrides = vec![override_row(
            category,
            "order_id",
            Some(FieldVisibility::Hidden),
            None,
        )];

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);

        assert!(!find(&fields, "order_id").visible);
    }

    #[test]
    fn required_override_wins_over_base_and_falls_back_when_absent() {
        let category = Uuid::new_v4();
        let configs = vec![
            config("order_id", true, false, DepartmentType::All),
            config("customer_email", true, true, DepartmentType::All),
        ];
        let overrides = vec![
            override_row(category, "order_id", None, Some(true)),
            override_row(category, "customer_email", None, None),
        ];

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);

        assert!(find(&fields, "order_id").required);
        assert!(find(&fields, "customer_email").required);
    }
}

// ============================================================================
// Core Fields
// ============================================================================

mod core_fields {
    use super::*;

    fn all_configs() -> Vec<FieldConfiguration> {
        CORE_FIELDS
            .iter()
            .map(|name| config(name, true, true, DepartmentType::All))
            .collect()
    }

    #[test]
    fn core_fields_visible_with_hostile_overrides() {
        let category = Uuid::new_v4();
        let overrides: Vec<_> = CORE_FIELDS
            .iter()
            .map(|name| override_row(category, name, Some(FieldVisibility::Hidden), None))
            .collect();

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &all_configs());

        for name in CORE_FIELDS {
            assert!(find(&fields, name).visible, "{} must stay visible", name);
        }
    }

    #[test]
    fn core_fields_visible_with_no_override_rows_at_all() {
        let fields = resolve_fields(DepartmentType::All, Some(&[]), &all_configs());

        for name in CORE_FIELDS {
            assert!(find(&fields, name).visible, "{} must stay visible", name);
        }
    }

    #[test]
    fn core_fields_visible_when_disabled_in_base_config() {
        let configs: Vec<_> = CORE_FIELDS
            .iter()
            .map(|name| config(name, false, true, DepartmentType::SellerSupport))
            .collect();

        let fields = resolve_fields(DepartmentType::CustomerSupport, None, &configs);

        for name in CORE_FIELDS {
            assert!(find(&fields, name).visible, "{} must stay visible", name);
        }
    }

    #[test]
    fn core_required_flag_still_resolves_normally() {
        let category = Uuid::new_v4();
        let configs = vec![config("issue_type", true, true, DepartmentType::All)];
        let overrides = vec![override_row(
            category,
            "issue_type",
            Some(FieldVisibility::Hidden),
            Some(false),
        )];

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);

        let issue_type = find(&fields, "issue_type");
        assert!(issue_type.visible);
        assert!(!issue_type.required);
    }
}

// ============================================================================
// Required Field Enforcement
// ============================================================================

mod required_enforcement {
    use super::*;

    #[test]
    fn hidden_required_fields_are_not_demanded_from_the_submitter() {
        let category = Uuid::new_v4();
        let configs = vec![config("order_id", true, true, DepartmentType::All)];
        let overrides = vec![override_row(
            category,
            "order_id",
            Some(FieldVisibility::Hidden),
            Some(true),
        )];

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);
        let missing = missing_required_fields(&fields, &HashMap::new());

        assert!(missing.is_empty());
    }

    #[test]
    fn visible_required_fields_must_be_present() {
        let category = Uuid::new_v4();
        let configs = vec![config("order_id", true, false, DepartmentType::All)];
        let overrides = vec![override_row(category, "order_id", None, Some(true))];

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);
        let missing = missing_required_fields(&fields, &HashMap::new());

        assert_eq!(missing, vec!["order_id"]);
    }
}
