//! Priority scoring service
//!
//! Combines the vendor's GMV tier (from the vendor directory), the
//! vendor's open-ticket history, and the category's issue points into a
//! priority score, tier, and badge.

use uuid::Uuid;

use crate::error::AppResult;
use crate::external::VendorDirectoryClient;
use crate::services::rule_store::RuleStore;
use shared::{score_priority, GmvTier, PriorityScore};

/// Priority scoring service
#[derive(Clone)]
pub struct PriorityService {
    store: RuleStore,
    vendor_directory: VendorDirectoryClient,
}

impl PriorityService {
    /// Create a new PriorityService instance
    pub fn new(store: RuleStore, vendor_directory: VendorDirectoryClient) -> Self {
        Self {
            store,
            vendor_directory,
        }
    }

    /// Score a ticket from its vendor handle and category.
    ///
    /// Missing inputs resolve to documented defaults: unknown vendors score
    /// as Bronze with no history, and a missing category contributes the
    /// default issue points.
    pub async fn score(
        &self,
        vendor_handle: Option<&str>,
        category_id: Option<Uuid>,
    ) -> AppResult<PriorityScore> {
        let (gmv_tier, open_count) = match vendor_handle {
            Some(handle) => {
                let vendor = self.vendor_directory.get_vendor(handle).await;
                let open_count = self.store.open_ticket_count_by_vendor(handle).await?;
                (vendor.gmv_tier, open_count)
            }
            None => (GmvTier::Bronze, 0),
        };

        let issue_points = match category_id {
            Some(category_id) => self
                .store
                .get_category(category_id)
                .await?
                .map(|c| c.issue_priority_points),
            None => None,
        };

        Ok(score_priority(gmv_tier, open_count, issue_points))
    }
}
