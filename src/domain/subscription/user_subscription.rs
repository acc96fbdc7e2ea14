//! User subscription entity created when a plan is activated.

use crate::domain::foundation::{
    DomainError, ErrorCode, PlanId, Timestamp, UserId, UserSubscriptionId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::SubscriptionPlan;

/// How a subscription came into existence.
///
/// Other sources (checkout, admin grants) belong to the billing system; this
/// service only ever writes redemption-sourced rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionSource {
    /// Activated by redeeming a code.
    Redemption,
}

impl SubscriptionSource {
    /// Value stored in the `source` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionSource::Redemption => "redemption",
        }
    }
}

impl fmt::Display for SubscriptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's entitlement to a plan for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubscription {
    pub id: UserSubscriptionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub source: SubscriptionSource,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

impl UserSubscription {
    /// Starts a subscription to `plan` at `now`, lasting one plan period.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the period end is past the representable range.
    pub fn start(
        user_id: UserId,
        plan: &SubscriptionPlan,
        source: SubscriptionSource,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        let ends_at = now
            .checked_add_days(i64::from(plan.duration_days))
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::OutOfRange,
                    format!(
                        "Plan {} duration of {} days overflows the subscription end",
                        plan.id, plan.duration_days
                    ),
                )
            })?;

        Ok(Self {
            id: UserSubscriptionId::new(),
            user_id,
            plan_id: plan.id,
            source,
            starts_at: now,
            ends_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(duration_days: i32) -> SubscriptionPlan {
        SubscriptionPlan {
            id: PlanId::new(4).unwrap(),
            title: "Pro Plan".to_string(),
            upgrade_group: None,
            duration_days,
        }
    }

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000).unwrap()
    }

    #[test]
    fn start_spans_one_plan_period() {
        let plan = plan(30);
        let sub = UserSubscription::start(
            UserId::new(1).unwrap(),
            &plan,
            SubscriptionSource::Redemption,
            now(),
        )
        .unwrap();

        assert_eq!(sub.plan_id, plan.id);
        assert_eq!(sub.source, SubscriptionSource::Redemption);
        assert_eq!(sub.starts_at, now());
        assert_eq!(sub.ends_at.as_unix_secs(), now().as_unix_secs() + 30 * 86_400);
    }

    #[test]
    fn start_rejects_unrepresentable_period() {
        let err = UserSubscription::start(
            UserId::new(1).unwrap(),
            &plan(i32::MAX),
            SubscriptionSource::Redemption,
            now(),
        )
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::OutOfRange);
    }

    #[test]
    fn source_column_value() {
        assert_eq!(SubscriptionSource::Redemption.as_str(), "redemption");
        assert_eq!(SubscriptionSource::Redemption.to_string(), "redemption");
    }
}
