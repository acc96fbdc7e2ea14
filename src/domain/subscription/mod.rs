//! Subscription domain module.
//!
//! The slice of the subscription model that redemption touches: reading a
//! plan and starting a user's subscription to it.

mod plan;
mod user_subscription;

pub use plan::SubscriptionPlan;
pub use user_subscription::{SubscriptionSource, UserSubscription};
