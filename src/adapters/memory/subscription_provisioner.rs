//! In-memory subscription provisioner.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::{SubscriptionPlan, SubscriptionSource, UserSubscription};
use crate::ports::SubscriptionProvisioner;

use super::InMemoryTransaction;

/// Stages a new subscription, plus the plan's group, on an
/// [`InMemoryTransaction`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemorySubscriptionProvisioner;

impl InMemorySubscriptionProvisioner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubscriptionProvisioner<InMemoryTransaction> for InMemorySubscriptionProvisioner {
    async fn create_from_plan(
        &self,
        tx: &mut InMemoryTransaction,
        user_id: UserId,
        plan: &SubscriptionPlan,
        source: SubscriptionSource,
    ) -> Result<UserSubscription, DomainError> {
        let subscription =
            UserSubscription::start(user_id, plan, source, Timestamp::now())?;
        tx.stage_subscription(subscription.clone())?;
        if let Some(group) = plan.upgrade_group() {
            tx.stage_user_group(user_id, group)?;
        }
        Ok(subscription)
    }
}
