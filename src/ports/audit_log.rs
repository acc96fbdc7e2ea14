//! Audit log port.

use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of user-facing event recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Wallet credit or plan activation.
    TopUp,
    Consume,
    Manage,
    System,
}

impl AuditEventType {
    /// Integer stored in the `logs.type` column.
    pub fn as_i16(&self) -> i16 {
        match self {
            AuditEventType::TopUp => 1,
            AuditEventType::Consume => 2,
            AuditEventType::Manage => 3,
            AuditEventType::System => 4,
        }
    }
}

/// Append-only record of user-visible account events.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends an entry for `user_id`.
    async fn record(
        &self,
        user_id: UserId,
        event_type: AuditEventType,
        message: &str,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_log_is_object_safe() {
        fn _accepts_dyn(_log: &dyn AuditLog) {}
    }

    #[test]
    fn top_up_is_stored_as_one() {
        assert_eq!(AuditEventType::TopUp.as_i16(), 1);
    }
}
