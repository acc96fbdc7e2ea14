//! CleanupRedemptionsHandler - Periodic sweep of codes that can no longer be redeemed.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::RedemptionRepository;

/// Command to sweep codes that are used, disabled or expired as of `now`.
#[derive(Debug, Clone, Copy)]
pub struct CleanupRedemptionsCommand {
    pub now: Timestamp,
}

/// Result of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupRedemptionsResult {
    pub deleted: u64,
}

/// Handler for the cleanup sweep.
pub struct CleanupRedemptionsHandler {
    repository: Arc<dyn RedemptionRepository>,
}

impl CleanupRedemptionsHandler {
    pub fn new(repository: Arc<dyn RedemptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: CleanupRedemptionsCommand,
    ) -> Result<CleanupRedemptionsResult, DomainError> {
        let deleted = self.repository.delete_invalid(cmd.now).await?;
        if deleted > 0 {
            info!(deleted, "Soft-deleted invalid redemption codes");
        }
        Ok(CleanupRedemptionsResult { deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRedemptionStore;
    use crate::domain::foundation::{ErrorCode, RedemptionId, UserId};
    use crate::domain::redemption::{NewRedemption, Redemption, RedemptionKey, RedemptionUpdate};
    use async_trait::async_trait;

    struct FailingRepository;

    #[async_trait]
    impl RedemptionRepository for FailingRepository {
        async fn create(&self, _new: &NewRedemption) -> Result<Redemption, DomainError> {
            unimplemented!()
        }

        async fn find_by_id(&self, _id: RedemptionId) -> Result<Option<Redemption>, DomainError> {
            Ok(None)
        }

        async fn update(
            &self,
            _id: RedemptionId,
            _update: &RedemptionUpdate,
        ) -> Result<Redemption, DomainError> {
            unimplemented!()
        }

        async fn soft_delete(&self, _id: RedemptionId) -> Result<(), DomainError> {
            Ok(())
        }

        async fn delete_invalid(&self, _now: Timestamp) -> Result<u64, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "Simulated sweep failure"))
        }
    }

    #[tokio::test]
    async fn sweeps_used_codes_and_reports_count() {
        let store = InMemoryRedemptionStore::new();
        for key in ["sweep-0001", "sweep-0002"] {
            let new = NewRedemption::new(RedemptionKey::new(key).unwrap(), key, 10, None, None)
                .unwrap();
            store.create(&new).await.unwrap();
        }
        let now = Timestamp::now();
        let mut used = store.find_by_key("sweep-0001").unwrap();
        used.mark_used(UserId::new(3).unwrap(), now).unwrap();
        store.put(used);

        let handler = CleanupRedemptionsHandler::new(Arc::new(store.clone()));
        let result = handler.handle(CleanupRedemptionsCommand { now }).await.unwrap();

        assert_eq!(result.deleted, 1);
        assert!(store.find_by_key("sweep-0001").is_none());
        assert!(store.find_by_key("sweep-0002").is_some());
    }

    #[tokio::test]
    async fn propagates_repository_errors() {
        let handler = CleanupRedemptionsHandler::new(Arc::new(FailingRepository));
        let err = handler
            .handle(CleanupRedemptionsCommand { now: Timestamp::now() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
