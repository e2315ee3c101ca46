//! Ticket intake field configuration and visibility resolution

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::DepartmentType;

/// Fields every intake form carries. They can never be hidden by
/// configuration; only their required flag resolves normally.
pub const CORE_FIELDS: [&str; 5] = [
    "subject",
    "description",
    "department",
    "issue_type",
    "category_id",
];

/// Base default for a single intake field, independent of category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfiguration {
    pub field_name: String,
    pub field_label: String,
    pub is_enabled: bool,
    pub is_required: bool,
    pub display_order: i32,
    pub department_type: DepartmentType,
}

/// Visibility override values a category may apply to a field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldVisibility {
    Visible,
    Hidden,
}

/// Category-scoped override of a base field configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFieldOverride {
    pub category_id: Uuid,
    pub field_name: String,
    pub visibility_override: Option<FieldVisibility>,
    pub required_override: Option<bool>,
}

/// A field after visibility/required resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedField {
    pub field_name: String,
    pub field_label: String,
    pub display_order: i32,
    pub visible: bool,
    pub required: bool,
    pub core: bool,
}

/// Resolve effective visibility and required flags for every configured
/// field.
///
/// Two modes, switched by whether a category is selected:
///
/// - No category yet: fields default to visible when enabled and their
///   department type applies to the requester's.
/// - Category selected: only fields with an override row for that category
///   are shown (absent row means hidden), so category-irrelevant fields
///   never leak into the form. An override row with no explicit visibility
///   value means visible.
///
/// Core fields are forced visible in both modes; their required flag still
/// resolves normally.
pub fn resolve_fields(
    department_type: DepartmentType,
    category_overrides: Option<&[CategoryFieldOverride]>,
    configs: &[FieldConfiguration],
) -> Vec<ResolvedField> {
    let mut resolved: Vec<ResolvedField> = configs
        .iter()
        .map(|config| {
            let core = CORE_FIELDS.contains(&config.field_name.as_str());

            let (mut visible, required) = match category_overrides {
                Some(overrides) => {
                    match overrides.iter().find(|o| o.field_name == config.field_name) {
                        Some(o) => (
                            o.visibility_override.unwrap_or(FieldVisibility::Visible)
                                == FieldVisibility::Visible,
                            o.required_override.unwrap_or(config.is_required),
                        ),
                        // Fail closed once a category is chosen
                        None => (false, config.is_required),
                    }
                }
                None => (
                    config.is_enabled && config.department_type.applies_to(department_type),
                    config.is_required,
                ),
            };

            if core {
                visible = true;
            }

            ResolvedField {
                field_name: config.field_name.clone(),
                field_label: config.field_label.clone(),
                display_order: config.display_order,
                visible,
                required,
                core,
            }
        })
        .collect();

    resolved.sort_by_key(|f| f.display_order);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn hide(category_id: Uuid, name: &str) -> CategoryFieldOverride {
        CategoryFieldOverride {
            category_id,
            field_name: name.to_string(),
            visibility_override: Some(FieldVisibility::Hidden),
            required_override: None,
        }
    }

    #[test]
    fn no_category_uses_department_type_defaults() {
        let configs = vec![
            config("order_id", true, false, DepartmentType::SellerSupport),
            config("app_version", true, false, DepartmentType::CustomerSupport),
            config("shared_field", true, false, DepartmentType::All),
        ];

        let fields = resolve_fields(DepartmentType::SellerSupport, None, &configs);

        let by_name = |name: &str| fields.iter().find(|f| f.field_name == name).unwrap();
        assert!(by_name("order_id").visible);
        assert!(!by_name("app_version").visible);
        assert!(by_name("shared_field").visible);
    }

    #[test]
    fn disabled_field_hidden_without_category() {
        let configs = vec![config("order_id", false, false, DepartmentType::All)];
        let fields = resolve_fields(DepartmentType::All, None, &configs);
        assert!(!fields[0].visible);
    }

    #[test]
    fn category_selected_hides_fields_without_override_rows() {
        let configs = vec![config("order_id", true, false, DepartmentType::All)];

        // Enabled in the base config, but no override row for the category
        let fields = resolve_fields(DepartmentType::All, Some(&[]), &configs);

        assert!(!fields[0].visible);
    }

    #[test]
    fn override_row_without_visibility_defaults_to_visible() {
        let category_id = Uuid::new_v4();
        let configs = vec![config("order_id", true, false, DepartmentType::All)];
        let overrides = vec![CategoryFieldOverride {
            category_id,
            field_name: "order_id".to_string(),
            visibility_override: None,
            required_override: Some(true),
        }];

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);

        assert!(fields[0].visible);
        assert!(fields[0].required);
    }

    #[test]
    fn core_fields_survive_hide_overrides() {
        let category_id = Uuid::new_v4();
        let configs: Vec<_> = CORE_FIELDS
            .iter()
            .map(|name| config(name, true, true, DepartmentType::All))
            .collect();
        let overrides: Vec<_> = CORE_FIELDS
            .iter()
            .map(|name| hide(category_id, name))
            .collect();

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);

        assert!(fields.iter().all(|f| f.visible && f.core));
    }

    #[test]
    fn core_fields_visible_even_when_disabled_in_base_config() {
        let configs = vec![config("subject", false, true, DepartmentType::SellerSupport)];
        let fields = resolve_fields(DepartmentType::CustomerSupport, None, &configs);
        assert!(fields[0].visible);
    }

    #[test]
    fn required_override_falls_back_to_base() {
        let category_id = Uuid::new_v4();
        let configs = vec![config("order_id", true, true, DepartmentType::All)];
        let overrides = vec![CategoryFieldOverride {
            category_id,
            field_name: "order_id".to_string(),
            visibility_override: Some(FieldVisibility::Visible),
            required_override: None,
        }];

        let fields = resolve_fields(DepartmentType::All, Some(&overrides), &configs);

        assert!(fields[0].required);
    }

    #[test]
    fn fields_sorted_by_display_order() {
        let mut first = config("subject", true, true, DepartmentType::All);
        first.display_order = 2;
        let mut second = config("description", true, true, DepartmentType::All);
        second.display_order = 1;

        let fields = resolve_fields(DepartmentType::All, None, &[first, second]);

        assert_eq!(fields[0].field_name, "description");
        assert_eq!(fields[1].field_name, "subject");
    }
}
