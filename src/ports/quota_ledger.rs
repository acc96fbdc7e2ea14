//! Quota ledger port.
//!
//! Wallet credit is only ever adjusted relatively (`quota = quota + delta`)
//! so concurrent adjustments never lose updates.

use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;

/// Adjusts user wallet balances inside a caller-supplied transaction `Tx`.
#[async_trait]
pub trait QuotaLedger<Tx: Send>: Send + Sync {
    /// Adds `delta` to the user's quota.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist
    /// - `DatabaseError` on persistence failure
    async fn adjust_relative(
        &self,
        tx: &mut Tx,
        user_id: UserId,
        delta: i64,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_ledger_is_object_safe() {
        fn _accepts_dyn(_ledger: &dyn QuotaLedger<()>) {}
    }
}
