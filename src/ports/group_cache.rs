//! Group cache port.
//!
//! Caches each user's entitlement group for fast access checks. Written
//! after a plan redemption commits; a stale entry expires on its own.

use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;

/// Write-through cache of user groups.
#[async_trait]
pub trait GroupCache: Send + Sync {
    /// Stores `group` as the user's current group.
    ///
    /// # Errors
    ///
    /// - `CacheError` if the cache is unreachable
    async fn refresh(&self, user_id: UserId, group: &str) -> Result<(), DomainError>;
}
