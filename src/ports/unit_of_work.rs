//! Unit-of-work ports for the redemption engine.
//!
//! A [`RedemptionTransaction`] is a scoped value: every write made through it
//! (including writes made by collaborators handed `&mut Tx`) is persisted only
//! by [`RedemptionTransaction::commit`]. Dropping the value without committing
//! rolls everything back and releases any row locks it holds, so a cancelled
//! or failed redemption never leaves partial state.
//!
//! # Example
//!
//! ```ignore
//! async fn disable(provider: &impl TransactionProvider, key: &RedemptionKey)
//!     -> Result<(), DomainError>
//! {
//!     let mut tx = provider.begin().await?;
//!     let Some(mut r) = tx.lock_by_key(key).await? else { return Ok(()) };
//!     r.status = RedemptionStatus::Disabled;
//!     tx.save_redemption(&r).await?;
//!     tx.commit().await
//! }
//! ```

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::redemption::{Redemption, RedemptionKey};
use crate::domain::subscription::SubscriptionPlan;
use async_trait::async_trait;

/// Opens redemption transactions.
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    /// Concrete transaction handed to collaborators.
    type Transaction: RedemptionTransaction + 'static;

    /// Begins a new transaction.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` if the backing store cannot start one
    async fn begin(&self) -> Result<Self::Transaction, DomainError>;
}

/// A single redemption's transactional scope.
#[async_trait]
pub trait RedemptionTransaction: Send {
    /// Locks the live (not soft-deleted) record for `key` and returns its
    /// current state.
    ///
    /// Blocks while another transaction holds the lock. The lock is held
    /// until this transaction commits or is dropped.
    async fn lock_by_key(&mut self, key: &RedemptionKey)
        -> Result<Option<Redemption>, DomainError>;

    /// Reads a subscription plan inside the transaction.
    async fn find_plan(&mut self, plan_id: PlanId)
        -> Result<Option<SubscriptionPlan>, DomainError>;

    /// Writes the record's mutable fields back.
    ///
    /// # Errors
    ///
    /// - `RedemptionNotFound` if the record is missing
    async fn save_redemption(&mut self, redemption: &Redemption) -> Result<(), DomainError>;

    /// Persists all writes and releases locks.
    async fn commit(self) -> Result<(), DomainError>;

    /// Discards all writes and releases locks.
    ///
    /// Equivalent to dropping the transaction, but reports backend errors.
    async fn rollback(self) -> Result<(), DomainError>;
}
