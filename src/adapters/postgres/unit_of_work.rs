//! PostgreSQL unit of work for redemption.
//!
//! Wraps a sqlx transaction. sqlx rolls a transaction back when it is
//! dropped uncommitted, which is what makes a cancelled redemption safe.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::redemption::{Redemption, RedemptionKey};
use crate::domain::subscription::SubscriptionPlan;
use crate::ports::{RedemptionTransaction, TransactionProvider};

use super::redemption_repository;

/// Opens [`PgRedemptionTransaction`]s on a pool.
#[derive(Clone)]
pub struct PgTransactionProvider {
    pool: PgPool,
}

impl PgTransactionProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionProvider for PgTransactionProvider {
    type Transaction = PgRedemptionTransaction;

    async fn begin(&self) -> Result<PgRedemptionTransaction, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;
        Ok(PgRedemptionTransaction { tx })
    }
}

/// A redemption transaction on one pooled connection.
pub struct PgRedemptionTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgRedemptionTransaction {
    /// Connection for collaborators joining this transaction.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut *self.tx
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: i64,
    title: String,
    upgrade_group: Option<String>,
    duration_days: i32,
}

#[async_trait]
impl RedemptionTransaction for PgRedemptionTransaction {
    async fn lock_by_key(
        &mut self,
        key: &RedemptionKey,
    ) -> Result<Option<Redemption>, DomainError> {
        redemption_repository::lock_by_key(self.conn(), key).await
    }

    async fn find_plan(&mut self, plan_id: PlanId) -> Result<Option<SubscriptionPlan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            "SELECT id, title, upgrade_group, duration_days FROM subscription_plans WHERE id = $1",
        )
        .bind(plan_id.as_i64())
        .fetch_optional(self.conn())
        .await
        .map_err(|e| DomainError::database("Failed to load subscription plan", e))?;

        Ok(row.and_then(|row| {
            PlanId::from_column(row.id).map(|id| SubscriptionPlan {
                id,
                title: row.title,
                upgrade_group: row.upgrade_group,
                duration_days: row.duration_days,
            })
        }))
    }

    async fn save_redemption(&mut self, redemption: &Redemption) -> Result<(), DomainError> {
        redemption_repository::write_back(self.conn(), redemption).await
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DomainError::database("Failed to roll back transaction", e))
    }
}
