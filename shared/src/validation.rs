//! Validation utilities for the Helpdesk Admin Platform

use std::collections::HashMap;

use crate::models::{AssignmentStrategy, ResolvedField};

// ============================================================================
// Ticket Intake Validations
// ============================================================================

/// Check that every resolved field that is both visible and required has a
/// non-blank value. Returns the names of the fields that are missing.
pub fn missing_required_fields(
    fields: &[ResolvedField],
    values: &HashMap<String, String>,
) -> Vec<String> {
    fields
        .iter()
        .filter(|field| field.visible && field.required)
        .filter(|field| {
            values
                .get(&field.field_name)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
        })
        .map(|field| field.field_name.clone())
        .collect()
}

/// Validate a ticket subject
pub fn validate_subject(subject: &str) -> Result<(), &'static str> {
    if subject.trim().is_empty() {
        return Err("Subject is required");
    }
    if subject.len() > 255 {
        return Err("Subject must be at most 255 characters");
    }
    Ok(())
}

// ============================================================================
// Configuration Validations
// ============================================================================

/// Validate a page/feature/field key (lowercase snake_case identifier)
pub fn validate_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("Key must not be empty");
    }
    if key.len() > 64 {
        return Err("Key must be at most 64 characters");
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err("Key must be lowercase alphanumeric with underscores");
    }
    Ok(())
}

/// Validate a permission name (`action:resource`)
pub fn validate_permission_name(name: &str) -> Result<(), &'static str> {
    let mut parts = name.splitn(2, ':');
    match (parts.next(), parts.next()) {
        (Some(action), Some(resource)) if !action.is_empty() && !resource.is_empty() => {
            validate_key(action)?;
            validate_key(resource)
        }
        _ => Err("Permission name must be formatted action:resource"),
    }
}

/// Validate routing rule fields that cannot be checked per-column.
///
/// A `specific_agent` rule with no agent would otherwise only fail at
/// routing time; rejecting it here keeps routing free of rule validation.
pub fn validate_routing_rule(
    strategy: AssignmentStrategy,
    assigned_agent_id: Option<uuid::Uuid>,
    priority_boost: i32,
) -> Result<(), &'static str> {
    if strategy == AssignmentStrategy::SpecificAgent && assigned_agent_id.is_none() {
        return Err("specific_agent rules must name an assigned agent");
    }
    if !(0..=100).contains(&priority_boost) {
        return Err("Priority boost must be between 0 and 100");
    }
    Ok(())
}

/// Validate SLA hour overrides
pub fn validate_sla_hours(hours: Option<i32>) -> Result<(), &'static str> {
    match hours {
        Some(h) if h <= 0 => Err("SLA hours must be positive"),
        Some(h) if h > 24 * 90 => Err("SLA hours must be at most 90 days"),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, visible: bool, required: bool) -> ResolvedField {
        ResolvedField {
            field_name: name.to_string(),
            field_label: name.to_string(),
            display_order: 0,
            visible,
            required,
            core: false,
        }
    }

    // ========================================================================
    // Required Field Tests
    // ========================================================================

    #[test]
    fn test_missing_required_fields_reports_absent_values() {
        let fields = vec![field("subject", true, true), field("order_id", true, true)];
        let mut values = HashMap::new();
        values.insert("subject".to_string(), "Payment failed".to_string());

        assert_eq!(missing_required_fields(&fields, &values), vec!["order_id"]);
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let fields = vec![field("subject", true, true)];
        let mut values = HashMap::new();
        values.insert("subject".to_string(), "   ".to_string());

        assert_eq!(missing_required_fields(&fields, &values), vec!["subject"]);
    }

    #[test]
    fn test_hidden_required_fields_are_not_enforced() {
        let fields = vec![field("order_id", false, true)];
        let values = HashMap::new();

        assert!(missing_required_fields(&fields, &values).is_empty());
    }

    #[test]
    fn test_optional_fields_are_not_enforced() {
        let fields = vec![field("attachment", true, false)];
        let values = HashMap::new();

        assert!(missing_required_fields(&fields, &values).is_empty());
    }

    // ========================================================================
    // Key Format Tests
    // ========================================================================

    #[test]
    fn test_validate_key_accepts_snake_case() {
        assert!(validate_key("ticket_list").is_ok());
        assert!(validate_key("export_csv2").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_bad_input() {
        assert!(validate_key("").is_err());
        assert!(validate_key("Ticket-List").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_permission_name() {
        assert!(validate_permission_name("edit:tickets").is_ok());
        assert!(validate_permission_name("edit").is_err());
        assert!(validate_permission_name(":tickets").is_err());
    }

    // ========================================================================
    // Routing Rule Tests
    // ========================================================================

    #[test]
    fn test_specific_agent_requires_agent_id() {
        assert!(
            validate_routing_rule(AssignmentStrategy::SpecificAgent, None, 0).is_err()
        );
        assert!(validate_routing_rule(
            AssignmentStrategy::SpecificAgent,
            Some(uuid::Uuid::new_v4()),
            0
        )
        .is_ok());
    }

    #[test]
    fn test_priority_boost_range() {
        assert!(validate_routing_rule(AssignmentStrategy::RoundRobin, None, -1).is_err());
        assert!(validate_routing_rule(AssignmentStrategy::RoundRobin, None, 101).is_err());
        assert!(validate_routing_rule(AssignmentStrategy::RoundRobin, None, 25).is_ok());
    }

    #[test]
    fn test_sla_hours_bounds() {
        assert!(validate_sla_hours(None).is_ok());
        assert!(validate_sla_hours(Some(4)).is_ok());
        assert!(validate_sla_hours(Some(0)).is_err());
        assert!(validate_sla_hours(Some(24 * 91)).is_err());
    }
}
