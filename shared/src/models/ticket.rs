//! Tickets and the routing-relevant status state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::category::CategorySnapshot;
use crate::models::priority::PriorityTier;

/// Ticket lifecycle status. Tickets are never deleted; terminal states are
/// soft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    New,
    Open,
    Pending,
    Solved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Solved => "solved",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "open" => TicketStatus::Open,
            "pending" => TicketStatus::Pending,
            "solved" => TicketStatus::Solved,
            "closed" => TicketStatus::Closed,
            _ => TicketStatus::New,
        }
    }

    /// Statuses counted as "open" for load and history purposes
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            TicketStatus::New | TicketStatus::Open | TicketStatus::Pending
        )
    }

    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// `New -> Open` happens on assignment (routing-induced or manual);
    /// `Pending` is a side branch from `Open` for awaiting-external-input
    /// states; `Solved -> Open` is a reopen.
    pub fn can_transition(&self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (New, Open)
                | (Open, Pending)
                | (Pending, Open)
                | (Open, Solved)
                | (Pending, Solved)
                | (Solved, Open)
                | (Solved, Closed)
        )
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::New => write!(f, "New"),
            TicketStatus::Open => write!(f, "Open"),
            TicketStatus::Pending => write!(f, "Pending"),
            TicketStatus::Solved => write!(f, "Solved"),
            TicketStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// A support ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub subject: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub category_snapshot: Option<CategorySnapshot>,
    pub department: String,
    pub vendor_handle: Option<String>,
    pub requester_id: Uuid,
    pub status: TicketStatus,
    pub priority_score: i32,
    pub priority_tier: PriorityTier,
    pub priority_badge: String,
    pub assignee_id: Option<Uuid>,
    pub sla_response_target: Option<DateTime<Utc>>,
    pub sla_resolve_target: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_opens_new_tickets() {
        assert!(TicketStatus::New.can_transition(TicketStatus::Open));
    }

    #[test]
    fn pending_is_a_side_branch_of_open() {
        assert!(TicketStatus::Open.can_transition(TicketStatus::Pending));
        assert!(TicketStatus::Pending.can_transition(TicketStatus::Open));
        assert!(TicketStatus::Pending.can_transition(TicketStatus::Solved));
    }

    #[test]
    fn closed_is_terminal() {
        for next in [
            TicketStatus::New,
            TicketStatus::Open,
            TicketStatus::Pending,
            TicketStatus::Solved,
        ] {
            assert!(!TicketStatus::Closed.can_transition(next));
        }
    }

    #[test]
    fn new_cannot_skip_to_solved() {
        assert!(!TicketStatus::New.can_transition(TicketStatus::Solved));
        assert!(!TicketStatus::New.can_transition(TicketStatus::Closed));
    }

    #[test]
    fn solved_tickets_can_reopen_or_close() {
        assert!(TicketStatus::Solved.can_transition(TicketStatus::Open));
        assert!(TicketStatus::Solved.can_transition(TicketStatus::Closed));
    }

    #[test]
    fn open_statuses_count_toward_load() {
        assert!(TicketStatus::New.is_open());
        assert!(TicketStatus::Open.is_open());
        assert!(TicketStatus::Pending.is_open());
        assert!(!TicketStatus::Solved.is_open());
        assert!(!TicketStatus::Closed.is_open());
    }
}
