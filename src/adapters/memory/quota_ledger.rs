//! In-memory quota ledger.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::QuotaLedger;

use super::InMemoryTransaction;

/// Stages relative balance changes on an [`InMemoryTransaction`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryQuotaLedger;

impl InMemoryQuotaLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuotaLedger<InMemoryTransaction> for InMemoryQuotaLedger {
    async fn adjust_relative(
        &self,
        tx: &mut InMemoryTransaction,
        user_id: UserId,
        delta: i64,
    ) -> Result<(), DomainError> {
        tx.stage_quota_delta(user_id, delta)
    }
}
