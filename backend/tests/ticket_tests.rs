//! Tests for the ticket status state machine and category display fallback

use shared::{
    category_display, Category, CategorySnapshot, DepartmentType, TicketStatus,
    DELETED_CATEGORY_LABEL,
};
use uuid::Uuid;

// ============================================================================
// Status State Machine
// ============================================================================

mod status_transitions {
    use super::*;
    use TicketStatus::*;

    #[test]
    fn happy_path_new_open_solved_closed() {
        assert!(New.can_transition(Open));
        assert!(Open.can_transition(Solved));
        assert!(Solved.can_transition(Closed));
    }

    #[test]
    fn pending_branches_from_open_and_back() {
        assert!(Open.can_transition(Pending));
        assert!(Pending.can_transition(Open));
        assert!(Pending.can_transition(Solved));
    }

    #[test]
    fn reopen_from_solved() {
        assert!(Solved.can_transition(Open));
    }

    #[test]
    fn disallowed_jumps_are_rejected() {
        assert!(!New.can_transition(Solved));
        assert!(!New.can_transition(Closed));
        assert!(!New.can_transition(Pending));
        assert!(!Open.can_transition(Closed));
        assert!(!Pending.can_transition(Closed));
        assert!(!Closed.can_transition(Open));
        assert!(!Closed.can_transition(Solved));
    }

    #[test]
    fn no_self_transitions() {
        for status in [New, Open, Pending, Solved, Closed] {
            assert!(!status.can_transition(status));
        }
    }

    #[test]
    fn open_statuses_for_load_counting() {
        assert!(New.is_open());
        assert!(Open.is_open());
        assert!(Pending.is_open());
        assert!(!Solved.is_open());
        assert!(!Closed.is_open());
    }

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [New, Open, Pending, Solved, Closed] {
            assert_eq!(TicketStatus::parse(status.as_str()), status);
        }
    }
}

// ============================================================================
// Category Display Fallback
// snapshot path -> live category path -> deleted-category label
// ============================================================================

mod category_fallback {
    use super::*;

    fn live_category(path: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            issue_type: "Order".to_string(),
            l1: "Orders".to_string(),
            l2: Some("Refunds".to_string()),
            l3: None,
            l4: None,
            path: path.to_string(),
            department_type: DepartmentType::SellerSupport,
            issue_priority_points: 20,
        }
    }

    #[test]
    fn snapshot_beats_live_category_when_they_disagree() {
        let live = live_category("Orders > Refunds (renamed)");
        let snapshot = CategorySnapshot {
            category_id: live.id,
            issue_type: "Order".to_string(),
            path: "Orders > Refunds".to_string(),
        };

        assert_eq!(
            category_display(Some(&snapshot), Some(&live)),
            "Orders > Refunds"
        );
    }

    #[test]
    fn live_category_used_when_no_snapshot_exists() {
        let live = live_category("Orders > Refunds");

        assert_eq!(category_display(None, Some(&live)), "Orders > Refunds");
    }

    #[test]
    fn deleted_label_when_nothing_survives() {
        assert_eq!(category_display(None, None), DELETED_CATEGORY_LABEL);
        assert_eq!(DELETED_CATEGORY_LABEL, "Unknown Category (Deleted)");
    }

    #[test]
    fn snapshot_of_copies_the_path_at_creation_time() {
        let live = live_category("Orders > Refunds");
        let snapshot = CategorySnapshot::of(&live);

        assert_eq!(snapshot.category_id, live.id);
        assert_eq!(snapshot.path, "Orders > Refunds");
        assert_eq!(snapshot.issue_type, "Order");
    }
}
