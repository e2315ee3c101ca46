//! Issue category hierarchy and the creation-time snapshot carried by
//! tickets

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::DepartmentType;

/// A node of the L1-L4 issue category hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub issue_type: String,
    pub l1: String,
    pub l2: Option<String>,
    pub l3: Option<String>,
    pub l4: Option<String>,
    /// Precomputed display string, e.g. `Orders > Refunds > Late delivery`
    pub path: String,
    pub department_type: DepartmentType,
    pub issue_priority_points: i32,
}

impl Category {
    /// Build the display path from the populated levels
    pub fn build_path(&self) -> String {
        build_category_path(
            &self.l1,
            self.l2.as_deref(),
            self.l3.as_deref(),
            self.l4.as_deref(),
        )
    }
}

/// Join the populated hierarchy levels into the display path
pub fn build_category_path(
    l1: &str,
    l2: Option<&str>,
    l3: Option<&str>,
    l4: Option<&str>,
) -> String {
    [Some(l1), l2, l3, l4]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Immutable point-in-time copy of a ticket's category, written at creation
/// so the label survives later deletion of the live category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySnapshot {
    pub category_id: Uuid,
    pub issue_type: String,
    pub path: String,
}

impl CategorySnapshot {
    pub fn of(category: &Category) -> Self {
        Self {
            category_id: category.id,
            issue_type: category.issue_type.clone(),
            path: category.path.clone(),
        }
    }
}

/// Display label shown for deleted categories with no surviving snapshot
pub const DELETED_CATEGORY_LABEL: &str = "Unknown Category (Deleted)";

/// Resolve a ticket's category label: snapshot first, then the live
/// category, then the deleted-category fallback. Never fails.
pub fn category_display(
    snapshot: Option<&CategorySnapshot>,
    live: Option<&Category>,
) -> String {
    snapshot
        .map(|s| s.path.clone())
        .or_else(|| live.map(|c| c.path.clone()))
        .unwrap_or_else(|| DELETED_CATEGORY_LABEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(path: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            issue_type: "Order".to_string(),
            l1: "Orders".to_string(),
            l2: None,
            l3: None,
            l4: None,
            path: path.to_string(),
            department_type: DepartmentType::All,
            issue_priority_points: 10,
        }
    }

    #[test]
    fn snapshot_takes_precedence_over_live_category() {
        let live = category("Orders > Refunds (renamed)");
        let snapshot = CategorySnapshot {
            category_id: live.id,
            issue_type: "Order".to_string(),
            path: "Orders > Refunds".to_string(),
        };

        let label = category_display(Some(&snapshot), Some(&live));

        assert_eq!(label, "Orders > Refunds");
    }

    #[test]
    fn falls_back_to_live_category_without_snapshot() {
        let live = category("Orders > Refunds");
        assert_eq!(category_display(None, Some(&live)), "Orders > Refunds");
    }

    #[test]
    fn deleted_category_fallback_label() {
        assert_eq!(category_display(None, None), DELETED_CATEGORY_LABEL);
    }

    #[test]
    fn build_path_joins_populated_levels() {
        let mut cat = category("");
        cat.l2 = Some("Refunds".to_string());
        assert_eq!(cat.build_path(), "Orders > Refunds");

        cat.l3 = Some("Late delivery".to_string());
        assert_eq!(cat.build_path(), "Orders > Refunds > Late delivery");
    }
}
