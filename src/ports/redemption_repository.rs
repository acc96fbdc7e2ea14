//! Redemption repository port (write side).
//!
//! Administrative persistence for redemption codes. Redeeming a code goes
//! through [`super::RedemptionTransaction`] instead, so it can hold a row
//! lock across the grant.
//!
//! Soft-deleted records are invisible to every method here.

use crate::domain::foundation::{DomainError, RedemptionId, Timestamp};
use crate::domain::redemption::{NewRedemption, Redemption, RedemptionUpdate};
use async_trait::async_trait;

/// Repository port for Redemption aggregate persistence.
#[async_trait]
pub trait RedemptionRepository: Send + Sync {
    /// Issues a new code. The store assigns the id; status starts `Enabled`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the key is already taken
    /// - `DatabaseError` on persistence failure
    async fn create(&self, new: &NewRedemption) -> Result<Redemption, DomainError>;

    /// Find a live code by id.
    async fn find_by_id(&self, id: RedemptionId) -> Result<Option<Redemption>, DomainError>;

    /// Applies a partial edit and returns the updated record.
    ///
    /// # Errors
    ///
    /// - `RedemptionNotFound` if the code is missing or deleted
    /// - validation codes if the edit is not allowed
    async fn update(
        &self,
        id: RedemptionId,
        update: &RedemptionUpdate,
    ) -> Result<Redemption, DomainError>;

    /// Soft-deletes a code.
    ///
    /// # Errors
    ///
    /// - `RedemptionNotFound` if the code is missing or already deleted
    async fn soft_delete(&self, id: RedemptionId) -> Result<(), DomainError>;

    /// Soft-deletes every code that can no longer be redeemed: used,
    /// disabled, or enabled with an expiry before `now`.
    ///
    /// Returns the number of records removed.
    async fn delete_invalid(&self, now: Timestamp) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redemption_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn RedemptionRepository) {}
    }
}
