//! PostgreSQL implementation of QuotaLedger.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::QuotaLedger;

use super::PgRedemptionTransaction;

/// Adjusts `users.quota` in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresQuotaLedger;

impl PostgresQuotaLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuotaLedger<PgRedemptionTransaction> for PostgresQuotaLedger {
    async fn adjust_relative(
        &self,
        tx: &mut PgRedemptionTransaction,
        user_id: UserId,
        delta: i64,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET quota = quota + $2 WHERE id = $1")
            .bind(user_id.as_i64())
            .bind(delta)
            .execute(tx.conn())
            .await
            .map_err(|e| DomainError::database("Failed to adjust user quota", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User {} not found", user_id),
            ));
        }
        Ok(())
    }
}
