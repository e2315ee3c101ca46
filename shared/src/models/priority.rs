//! Ticket priority scoring

use serde::{Deserialize, Serialize};

use crate::models::vendor::GmvTier;

/// Issue points applied when a ticket has no category
pub const DEFAULT_ISSUE_POINTS: i32 = 10;

/// Cap on the contribution of a vendor's open-ticket history
pub const HISTORY_POINTS_CAP: i32 = 20;

/// Priority tier mapped from a numeric score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityTier {
    /// Map a score to its tier. Thresholds are inclusive lower bounds,
    /// checked in descending order.
    pub fn for_score(score: i32) -> Self {
        match score {
            s if s >= 70 => PriorityTier::Critical,
            s if s >= 50 => PriorityTier::High,
            s if s >= 30 => PriorityTier::Medium,
            _ => PriorityTier::Low,
        }
    }

    /// The P0-P3 badge shown next to the tier
    pub fn badge(&self) -> &'static str {
        match self {
            PriorityTier::Critical => "P0",
            PriorityTier::High => "P1",
            PriorityTier::Medium => "P2",
            PriorityTier::Low => "P3",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::Critical => "critical",
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "critical" => PriorityTier::Critical,
            "high" => PriorityTier::High,
            "medium" => PriorityTier::Medium,
            _ => PriorityTier::Low,
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityTier::Critical => write!(f, "Critical"),
            PriorityTier::High => write!(f, "High"),
            PriorityTier::Medium => write!(f, "Medium"),
            PriorityTier::Low => write!(f, "Low"),
        }
    }
}

/// A computed priority: numeric score plus its mapped tier and badge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorityScore {
    pub score: i32,
    pub tier: PriorityTier,
    pub badge: String,
}

impl PriorityScore {
    pub fn from_score(score: i32) -> Self {
        let tier = PriorityTier::for_score(score);
        Self {
            score,
            tier,
            badge: tier.badge().to_string(),
        }
    }

    /// Re-evaluate tier and badge after a routing priority boost
    pub fn boosted(&self, boost: i32) -> Self {
        Self::from_score(self.score + boost)
    }
}

/// Points contributed by the vendor's GMV tier
pub fn gmv_points(tier: GmvTier) -> i32 {
    match tier {
        GmvTier::Platinum => 40,
        GmvTier::Gold => 30,
        GmvTier::Silver => 20,
        GmvTier::Bronze => 10,
    }
}

/// Points contributed by the vendor's currently-open tickets, capped
pub fn history_points(open_ticket_count: i64) -> i32 {
    let count = i32::try_from(open_ticket_count).unwrap_or(i32::MAX / 5);
    (count.saturating_mul(5)).min(HISTORY_POINTS_CAP)
}

/// Score a ticket from its vendor tier, the vendor's open-ticket count at
/// scoring time, and the category's issue points. The open-ticket count is
/// a point-in-time snapshot; races only affect score accuracy.
pub fn score_priority(
    gmv_tier: GmvTier,
    open_ticket_count: i64,
    issue_points: Option<i32>,
) -> PriorityScore {
    let score = gmv_points(gmv_tier)
        + history_points(open_ticket_count)
        + issue_points.unwrap_or(DEFAULT_ISSUE_POINTS);
    PriorityScore::from_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platinum_with_capped_history_is_critical() {
        let priority = score_priority(GmvTier::Platinum, 5, Some(10));
        assert_eq!(priority.score, 70);
        assert_eq!(priority.tier, PriorityTier::Critical);
        assert_eq!(priority.badge, "P0");
    }

    #[test]
    fn bronze_with_no_history_is_low() {
        let priority = score_priority(GmvTier::Bronze, 0, Some(10));
        assert_eq!(priority.score, 20);
        assert_eq!(priority.tier, PriorityTier::Low);
        assert_eq!(priority.badge, "P3");
    }

    #[test]
    fn missing_category_defaults_issue_points() {
        let priority = score_priority(GmvTier::Silver, 1, None);
        assert_eq!(priority.score, 20 + 5 + DEFAULT_ISSUE_POINTS);
    }

    #[test]
    fn history_points_cap_at_four_open_tickets() {
        assert_eq!(history_points(0), 0);
        assert_eq!(history_points(3), 15);
        assert_eq!(history_points(4), 20);
        assert_eq!(history_points(100), 20);
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(PriorityTier::for_score(70), PriorityTier::Critical);
        assert_eq!(PriorityTier::for_score(69), PriorityTier::High);
        assert_eq!(PriorityTier::for_score(50), PriorityTier::High);
        assert_eq!(PriorityTier::for_score(49), PriorityTier::Medium);
        assert_eq!(PriorityTier::for_score(30), PriorityTier::Medium);
        assert_eq!(PriorityTier::for_score(29), PriorityTier::Low);
    }

    #[test]
    fn boost_re_evaluates_tier_and_badge() {
        let base = score_priority(GmvTier::Silver, 0, Some(10));
        assert_eq!(base.tier, PriorityTier::Medium);

        let boosted = base.boosted(25);
        assert_eq!(boosted.score, 55);
        assert_eq!(boosted.tier, PriorityTier::High);
        assert_eq!(boosted.badge, "P1");
    }
}
