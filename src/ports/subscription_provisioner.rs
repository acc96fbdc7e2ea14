//! Subscription provisioner port.
//!
//! Starts a user's subscription to a plan. The write joins the caller's
//! transaction so it commits or rolls back with the redemption record.

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::{SubscriptionPlan, SubscriptionSource, UserSubscription};
use async_trait::async_trait;

/// Creates subscriptions inside a caller-supplied transaction `Tx`.
#[async_trait]
pub trait SubscriptionProvisioner<Tx: Send>: Send + Sync {
    /// Starts a subscription to `plan` for `user_id`.
    ///
    /// Implementations also move the user into the plan's upgrade group
    /// when one is set.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist
    /// - `DatabaseError` on persistence failure
    async fn create_from_plan(
        &self,
        tx: &mut Tx,
        user_id: UserId,
        plan: &SubscriptionPlan,
        source: SubscriptionSource,
    ) -> Result<UserSubscription, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_provisioner_is_object_safe() {
        fn _accepts_dyn(_provisioner: &dyn SubscriptionProvisioner<()>) {}
    }
}
