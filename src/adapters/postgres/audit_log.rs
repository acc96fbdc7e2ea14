//! PostgreSQL implementation of AuditLog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::{AuditEventType, AuditLog};

/// Appends rows to the `logs` table.
pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn record(
        &self,
        user_id: UserId,
        event_type: AuditEventType,
        message: &str,
    ) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO logs (user_id, type, content, created_at) VALUES ($1, $2, $3, $4)")
            .bind(user_id.as_i64())
            .bind(event_type.as_i16())
            .bind(message)
            .bind(Timestamp::now().as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to record audit entry", e))?;
        Ok(())
    }
}
