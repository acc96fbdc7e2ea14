//! Subscription plan, as seen by redemption.

use crate::domain::foundation::PlanId;
use serde::{Deserialize, Serialize};

/// A purchasable entitlement tier.
///
/// Read-only to this service; pricing lives with the billing system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub title: String,

    /// Entitlement group granted while the subscription is active.
    pub upgrade_group: Option<String>,

    /// Length of one subscription period.
    pub duration_days: i32,
}

impl SubscriptionPlan {
    /// Returns the upgrade group if it is set and non-blank.
    pub fn upgrade_group(&self) -> Option<&str> {
        self.upgrade_group
            .as_deref()
            .map(str::trim)
            .filter(|group| !group.is_empty())
    }
}
