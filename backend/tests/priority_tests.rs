//! Tests for ticket priority scoring
//!
//! Verifies the GMV/history/issue point formula and the tier threshold
//! boundaries

use proptest::prelude::*;
use shared::{
    gmv_points, history_points, score_priority, GmvTier, PriorityTier, HISTORY_POINTS_CAP,
};

// ============================================================================
// Worked Examples
// ============================================================================

mod worked_examples {
    use super::*;

    #[test]
    fn platinum_vendor_with_heavy_history_scores_critical() {
        // gmv 40 + history min(5*5, 20) + issue 10 = 70
        let priority = score_priority(GmvTier::Platinum, 5, Some(10));

        assert_eq!(priority.score, 70);
        assert_eq!(priority.tier, PriorityTier::Critical);
        assert_eq!(priority.badge, "P0");
    }

    #[test]
    fn bronze_vendor_with_no_history_scores_low() {
        // gmv 10 + history 0 + issue 10 = 20
        let priority = score_priority(GmvTier::Bronze, 0, Some(10));

        assert_eq!(priority.score, 20);
        assert_eq!(priority.tier, PriorityTier::Low);
        assert_eq!(priority.badge, "P3");
    }

    #[test]
    fn gmv_point_table() {
        assert_eq!(gmv_points(GmvTier::Platinum), 40);
        assert_eq!(gmv_points(GmvTier::Gold), 30);
        assert_eq!(gmv_points(GmvTier::Silver), 20);
        assert_eq!(gmv_points(GmvTier::Bronze), 10);
    }

    #[test]
    fn missing_category_contributes_default_issue_points() {
        let with_default = score_priority(GmvTier::Gold, 2, None);
        let with_explicit = score_priority(GmvTier::Gold, 2, Some(10));

        assert_eq!(with_default.score, with_explicit.score);
    }
}

// ============================================================================
// Tier Boundary Tests
// Thresholds are inclusive lower bounds checked in descending order
// ============================================================================

mod tier_boundaries {
    use super::*;

    #[test]
    fn seventy_is_critical_sixty_nine_is_high() {
        assert_eq!(PriorityTier::for_score(70), PriorityTier::Critical);
        assert_eq!(PriorityTier::for_score(69), PriorityTier::High);
    }

    #[test]
    fn fifty_is_high_forty_nine_is_medium() {
        assert_eq!(PriorityTier::for_score(50), PriorityTier::High);
        assert_eq!(PriorityTier::for_score(49), PriorityTier::Medium);
    }

    #[test]
    fn thirty_is_medium_twenty_nine_is_low() {
        assert_eq!(PriorityTier::for_score(30), PriorityTier::Medium);
        assert_eq!(PriorityTier::for_score(29), PriorityTier::Low);
    }

    #[test]
    fn badges_follow_tiers() {
        assert_eq!(PriorityTier::Critical.badge(), "P0");
        assert_eq!(PriorityTier::High.badge(), "P1");
        assert_eq!(PriorityTier::Medium.badge(), "P2");
        assert_eq!(PriorityTier::Low.badge(), "P3");
    }
}

// ============================================================================
// History Cap Tests
// ============================================================================

mod history_cap {
    use super::*;

    #[test]
    fn five_points_per_open_ticket_until_cap() {
        assert_eq!(history_points(0), 0);
        assert_eq!(history_points(1), 5);
        assert_eq!(history_points(2), 10);
        assert_eq!(history_points(3), 15);
        assert_eq!(history_points(4), 20);
    }

    #[test]
    fn cap_holds_for_large_backlogs() {
        assert_eq!(history_points(5), HISTORY_POINTS_CAP);
        assert_eq!(history_points(1_000), HISTORY_POINTS_CAP);
        assert_eq!(history_points(i64::MAX), HISTORY_POINTS_CAP);
    }
}

// ============================================================================
// Boost Re-evaluation Tests
// ============================================================================

mod boost {
    use super::*;

    #[test]
    fn boost_crossing_a_threshold_changes_tier_and_badge() {
        let base = score_priority(GmvTier::Silver, 0, Some(10));
        assert_eq!(base.tier, PriorityTier::Medium);

        let boosted = base.boosted(25);
        assert_eq!(boosted.score, 55);
        assert_eq!(boosted.tier, PriorityTier::High);
        assert_eq!(boosted.badge, "P1");
    }

    #[test]
    fn zero_boost_changes_nothing() {
        let base = score_priority(GmvTier::Platinum, 3, Some(15));
        let boosted = base.boosted(0);

        assert_eq!(base, boosted);
    }
}

// ============================================================================
// Score Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Score is the exact sum of its three components
    #[test]
    fn score_is_sum_of_components(
        open_count in 0i64..10_000,
        issue_points in 0i32..100,
    ) {
        for tier in [GmvTier::Platinum, GmvTier::Gold, GmvTier::Silver, GmvTier::Bronze] {
            let priority = score_priority(tier, open_count, Some(issue_points));
            prop_assert_eq!(
                priority.score,
                gmv_points(tier) + history_points(open_count) + issue_points
            );
        }
    }

    /// More open tickets never lowers the score
    #[test]
    fn score_monotonic_in_open_count(
        open_count in 0i64..1_000,
    ) {
        let lower = score_priority(GmvTier::Gold, open_count, Some(10));
        let higher = score_priority(GmvTier::Gold, open_count + 1, Some(10));
        prop_assert!(higher.score >= lower.score);
    }

    /// The tier derived from a score always matches the stored badge
    #[test]
    fn tier_and_badge_agree(score in 0i32..200) {
        let tier = PriorityTier::for_score(score);
        let rebuilt = shared::PriorityScore::from_score(score);
        prop_assert_eq!(rebuilt.tier, tier);
        prop_assert_eq!(rebuilt.badge, tier.badge());
    }
}
