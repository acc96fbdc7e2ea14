//! In-memory audit log.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{AuditEventType, AuditLog};

/// A recorded audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub user_id: UserId,
    pub event_type: AuditEventType,
    pub message: String,
    pub recorded_at: Timestamp,
}

/// Audit log that keeps entries in memory.
///
/// # Panics
///
/// `entries` panics if the internal lock is poisoned.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
    unavailable: bool,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose every call fails with `DatabaseError`.
    pub fn unavailable() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            unavailable: true,
        }
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .expect("InMemoryAuditLog: lock poisoned")
            .clone()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn record(
        &self,
        user_id: UserId,
        event_type: AuditEventType,
        message: &str,
    ) -> Result<(), DomainError> {
        if self.unavailable {
            return Err(DomainError::new(ErrorCode::DatabaseError, "Audit log unavailable"));
        }
        self.entries
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Audit log lock poisoned"))?
            .push(AuditEntry {
                user_id,
                event_type,
                message: message.to_string(),
                recorded_at: Timestamp::now(),
            });
        Ok(())
    }
}
