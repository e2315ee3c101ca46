//! Routing rules and the assignee selection strategies

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a routing rule picks an assignee when auto-assignment is enabled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    RoundRobin,
    LeastLoaded,
    SpecificAgent,
}

impl AssignmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStrategy::RoundRobin => "round_robin",
            AssignmentStrategy::LeastLoaded => "least_loaded",
            AssignmentStrategy::SpecificAgent => "specific_agent",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "least_loaded" => AssignmentStrategy::LeastLoaded,
            "specific_agent" => AssignmentStrategy::SpecificAgent,
            _ => AssignmentStrategy::RoundRobin,
        }
    }
}

/// Per-category routing configuration. At most one active rule exists per
/// category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRule {
    pub id: Uuid,
    pub category_id: Uuid,
    pub target_department: String,
    pub auto_assign_enabled: bool,
    pub assignment_strategy: AssignmentStrategy,
    pub assigned_agent_id: Option<Uuid>,
    pub priority_boost: i32,
    pub sla_response_hours_override: Option<i32>,
    pub sla_resolution_hours_override: Option<i32>,
    pub is_active: bool,
}

/// An agent together with their open-ticket count at selection time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentLoad {
    pub agent_id: Uuid,
    pub open_tickets: i64,
}

/// Pick the agent at `cursor_position` of the rotation over `roster`.
///
/// The roster is read fresh at each call, so membership changes take effect
/// on the next assignment. The cursor itself is durable, incremented
/// atomically by the caller; this function only applies the modulo.
pub fn pick_round_robin(roster: &[Uuid], cursor_position: i64) -> Option<Uuid> {
    if roster.is_empty() {
        return None;
    }
    let index = (cursor_position.rem_euclid(roster.len() as i64)) as usize;
    Some(roster[index])
}

/// Pick the agent with the fewest open tickets, ties broken by agent id
/// ascending so identical load never causes assignment oscillation.
pub fn pick_least_loaded(loads: &[AgentLoad]) -> Option<Uuid> {
    loads
        .iter()
        .min_by_key(|load| (load.open_tickets, load.agent_id))
        .map(|load| load.agent_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn round_robin_rotates_through_roster() {
        let roster = vec![id(1), id(2), id(3)];

        let picks: Vec<_> = (0..6)
            .map(|cursor| pick_round_robin(&roster, cursor).unwrap())
            .collect();

        assert_eq!(picks, vec![id(1), id(2), id(3), id(1), id(2), id(3)]);
    }

    #[test]
    fn round_robin_six_assignments_give_each_of_three_agents_two() {
        let roster = vec![id(1), id(2), id(3)];
        let mut counts = std::collections::HashMap::new();

        for cursor in 0..6 {
            let agent = pick_round_robin(&roster, cursor).unwrap();
            *counts.entry(agent).or_insert(0) += 1;
        }

        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn round_robin_empty_roster_assigns_nobody() {
        assert_eq!(pick_round_robin(&[], 3), None);
    }

    #[test]
    fn round_robin_starts_from_cursor_position() {
        let roster = vec![id(1), id(2), id(3)];
        assert_eq!(pick_round_robin(&roster, 4), Some(id(2)));
    }

    #[test]
    fn least_loaded_picks_lowest_count() {
        let loads = vec![
            AgentLoad { agent_id: id(1), open_tickets: 3 },
            AgentLoad { agent_id: id(2), open_tickets: 1 },
            AgentLoad { agent_id: id(3), open_tickets: 1 },
        ];

        // B wins outright on count; the id tie-break is between B and C
        assert_eq!(pick_least_loaded(&loads), Some(id(2)));
    }

    #[test]
    fn least_loaded_tie_breaks_by_agent_id() {
        let loads = vec![
            AgentLoad { agent_id: id(9), open_tickets: 2 },
            AgentLoad { agent_id: id(4), open_tickets: 2 },
        ];

        assert_eq!(pick_least_loaded(&loads), Some(id(4)));
    }

    #[test]
    fn least_loaded_empty_roster_assigns_nobody() {
        assert_eq!(pick_least_loaded(&[]), None);
    }
}
