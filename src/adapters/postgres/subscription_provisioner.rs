//! PostgreSQL implementation of SubscriptionProvisioner.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::{SubscriptionPlan, SubscriptionSource, UserSubscription};
use crate::ports::SubscriptionProvisioner;

use super::PgRedemptionTransaction;

/// Inserts into `user_subscriptions` and updates `users."group"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresSubscriptionProvisioner;

impl PostgresSubscriptionProvisioner {
    pub fn new() -> Self {
        Self
    }
}

fn user_not_found(user_id: UserId) -> DomainError {
    DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", user_id))
}

#[async_trait]
impl SubscriptionProvisioner<PgRedemptionTransaction> for PostgresSubscriptionProvisioner {
    async fn create_from_plan(
        &self,
        tx: &mut PgRedemptionTransaction,
        user_id: UserId,
        plan: &SubscriptionPlan,
        source: SubscriptionSource,
    ) -> Result<UserSubscription, DomainError> {
        let subscription =
            UserSubscription::start(user_id, plan, source, Timestamp::now())?;

        sqlx::query(
            r#"
            INSERT INTO user_subscriptions (id, user_id, plan_id, source, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(user_id.as_i64())
        .bind(plan.id.as_i64())
        .bind(source.as_str())
        .bind(subscription.starts_at.as_datetime())
        .bind(subscription.ends_at.as_datetime())
        .execute(tx.conn())
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("user_subscriptions_user_id_fkey") {
                    return user_not_found(user_id);
                }
            }
            DomainError::database("Failed to create subscription", e)
        })?;

        if let Some(group) = plan.upgrade_group() {
            let result = sqlx::query(r#"UPDATE users SET "group" = $2 WHERE id = $1"#)
                .bind(user_id.as_i64())
                .bind(group)
                .execute(tx.conn())
                .await
                .map_err(|e| DomainError::database("Failed to update user group", e))?;

            if result.rows_affected() == 0 {
                return Err(user_not_found(user_id));
            }
        }

        Ok(subscription)
    }
}
