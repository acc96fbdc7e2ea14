//! In-memory redemption store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};

use crate::domain::foundation::{
    DomainError, ErrorCode, PlanId, RedemptionId, Timestamp, UserId,
};
use crate::domain::redemption::{
    NewRedemption, Redemption, RedemptionKey, RedemptionUpdate, SearchKeyword,
};
use crate::domain::subscription::{SubscriptionPlan, UserSubscription};
use crate::ports::{
    Page, PageRequest, RedemptionReader, RedemptionRepository, TransactionProvider,
};

use super::transaction::InMemoryTransaction;

/// Account fields the redemption engine touches.
#[derive(Debug, Clone, Default)]
pub(super) struct UserAccount {
    pub quota: i64,
    pub group: Option<String>,
}

/// Committed state shared by the store and its transactions.
#[derive(Debug, Default)]
pub(super) struct StoreState {
    pub next_id: i64,
    pub redemptions: BTreeMap<RedemptionId, Redemption>,
    pub plans: HashMap<PlanId, SubscriptionPlan>,
    pub users: HashMap<UserId, UserAccount>,
    pub subscriptions: Vec<UserSubscription>,
}

impl StoreState {
    /// Live record for `key`, ignoring soft-deleted ones.
    pub fn find_live_by_key(&self, key: &RedemptionKey) -> Option<&Redemption> {
        self.redemptions
            .values()
            .find(|r| &r.key == key && !r.is_deleted())
    }

    fn find_live_mut(&mut self, id: RedemptionId) -> Option<&mut Redemption> {
        self.redemptions.get_mut(&id).filter(|r| !r.is_deleted())
    }
}

/// Per-key row locks.
///
/// An entry lives while a transaction holds or waits on it; idle entries are
/// pruned on the next acquire, so unknown keys do not accumulate.
#[derive(Debug, Default)]
pub(super) struct RowLocks {
    locks: Mutex<HashMap<String, Arc<RowLock<()>>>>,
}

impl RowLocks {
    /// Waits for the row lock on `key`.
    pub async fn acquire(&self, key: &RedemptionKey) -> Result<OwnedMutexGuard<()>, DomainError> {
        let lock = {
            let mut locks = self.locks.lock().map_err(|_| poisoned("row lock table"))?;
            // The table's own reference is the only one left on an idle entry.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(key.as_str().to_string())
                .or_insert_with(|| Arc::new(RowLock::new(())))
                .clone()
        };
        Ok(lock.lock_owned().await)
    }

    /// Number of entries currently tracked.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

pub(super) fn poisoned(what: &str) -> DomainError {
    DomainError::new(ErrorCode::InternalError, format!("{} lock poisoned", what))
}

pub(super) fn lock_state(state: &Mutex<StoreState>) -> Result<MutexGuard<'_, StoreState>, DomainError> {
    state.lock().map_err(|_| poisoned("redemption store"))
}

/// In-memory implementation of the redemption store ports.
///
/// Cloning is cheap and shares state, so one store can back the engine,
/// the admin handlers and test assertions at once.
///
/// # Panics
///
/// The seeding and inspection helpers panic if the state lock is poisoned.
/// Port methods report poisoning as `InternalError` instead.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRedemptionStore {
    state: Arc<Mutex<StoreState>>,
    row_locks: Arc<RowLocks>,
}

impl InMemoryRedemptionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Adds or replaces a subscription plan.
    pub fn insert_plan(&self, plan: SubscriptionPlan) {
        self.state_for_helper().plans.insert(plan.id, plan);
    }

    /// Adds or replaces a user account with the given balance.
    pub fn insert_user(&self, user_id: UserId, quota: i64) {
        self.state_for_helper().users.insert(
            user_id,
            UserAccount {
                quota,
                group: None,
            },
        );
    }

    /// Current balance of a user.
    pub fn user_quota(&self, user_id: UserId) -> Option<i64> {
        self.state_for_helper().users.get(&user_id).map(|u| u.quota)
    }

    /// Current group of a user.
    pub fn user_group(&self, user_id: UserId) -> Option<String> {
        self.state_for_helper()
            .users
            .get(&user_id)
            .and_then(|u| u.group.clone())
    }

    /// Subscriptions owned by a user, oldest first.
    pub fn subscriptions_for(&self, user_id: UserId) -> Vec<UserSubscription> {
        self.state_for_helper()
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Live record for a key.
    pub fn find_by_key(&self, key: &str) -> Option<Redemption> {
        let key = RedemptionKey::new(key).ok()?;
        self.state_for_helper().find_live_by_key(&key).cloned()
    }

    /// Overwrites a stored record as-is, bypassing edit rules.
    pub fn put(&self, redemption: Redemption) {
        let mut state = self.state_for_helper();
        state.next_id = state.next_id.max(redemption.id.as_i64());
        state.redemptions.insert(redemption.id, redemption);
    }

    /// Key of a live record, used to take its row lock.
    fn live_key(&self, id: RedemptionId) -> Result<RedemptionKey, DomainError> {
        let state = lock_state(&self.state)?;
        state
            .redemptions
            .get(&id)
            .filter(|r| !r.is_deleted())
            .map(|r| r.key.clone())
            .ok_or_else(|| not_found(id))
    }

    fn state_for_helper(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .expect("InMemoryRedemptionStore: state lock poisoned")
    }

    fn page_of<'a>(
        matches: impl Iterator<Item = &'a Redemption>,
        page: PageRequest,
    ) -> Page<Redemption> {
        let all: Vec<&Redemption> = matches.collect();
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Page { items, total }
    }
}

#[async_trait]
impl TransactionProvider for InMemoryRedemptionStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction, DomainError> {
        Ok(InMemoryTransaction::new(
            Arc::clone(&self.state),
            Arc::clone(&self.row_locks),
        ))
    }
}

#[async_trait]
impl RedemptionRepository for InMemoryRedemptionStore {
    async fn create(&self, new: &NewRedemption) -> Result<Redemption, DomainError> {
        let mut state = lock_state(&self.state)?;
        if state.redemptions.values().any(|r| r.key == new.key) {
            return Err(DomainError::validation("key", "Redemption key already exists"));
        }
        state.next_id += 1;
        let redemption = Redemption::issue(
            RedemptionId::from_i64(state.next_id),
            new.clone(),
            Timestamp::now(),
        );
        state.redemptions.insert(redemption.id, redemption.clone());
        Ok(redemption)
    }

    async fn find_by_id(&self, id: RedemptionId) -> Result<Option<Redemption>, DomainError> {
        let state = lock_state(&self.state)?;
        Ok(state.redemptions.get(&id).filter(|r| !r.is_deleted()).cloned())
    }

    async fn update(
        &self,
        id: RedemptionId,
        update: &RedemptionUpdate,
    ) -> Result<Redemption, DomainError> {
        // Edits wait behind an in-flight redemption of the same row.
        let key = self.live_key(id)?;
        let _row = self.row_locks.acquire(&key).await?;

        let mut state = lock_state(&self.state)?;
        let current = state.find_live_mut(id).ok_or_else(|| not_found(id))?;
        let mut edited = current.clone();
        edited.apply_update(update)?;
        *current = edited.clone();
        Ok(edited)
    }

    async fn soft_delete(&self, id: RedemptionId) -> Result<(), DomainError> {
        let key = self.live_key(id)?;
        let _row = self.row_locks.acquire(&key).await?;

        let mut state = lock_state(&self.state)?;
        let current = state.find_live_mut(id).ok_or_else(|| not_found(id))?;
        current.deleted_at = Some(Timestamp::now());
        Ok(())
    }

    async fn delete_invalid(&self, now: Timestamp) -> Result<u64, DomainError> {
        let mut state = lock_state(&self.state)?;
        let mut removed = 0;
        for redemption in state.redemptions.values_mut() {
            if !redemption.is_deleted() && redemption.is_eligible_for_cleanup(now) {
                redemption.deleted_at = Some(now);
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl RedemptionReader for InMemoryRedemptionStore {
    async fn list(&self, page: PageRequest) -> Result<Page<Redemption>, DomainError> {
        let state = lock_state(&self.state)?;
        Ok(Self::page_of(
            state.redemptions.values().rev().filter(|r| !r.is_deleted()),
            page,
        ))
    }

    async fn search(
        &self,
        keyword: &SearchKeyword,
        page: PageRequest,
    ) -> Result<Page<Redemption>, DomainError> {
        let state = lock_state(&self.state)?;
        Ok(Self::page_of(
            state
                .redemptions
                .values()
                .rev()
                .filter(|r| !r.is_deleted() && keyword.matches(r)),
            page,
        ))
    }
}

fn not_found(id: RedemptionId) -> DomainError {
    DomainError::new(
        ErrorCode::RedemptionNotFound,
        format!("Redemption {} not found", id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::redemption::RedemptionStatus;
    use crate::ports::RedemptionTransaction;
    use std::time::Duration;

    fn new_code(key: &str, name: &str) -> NewRedemption {
        NewRedemption::new(RedemptionKey::new(key).unwrap(), name, 100, None, None).unwrap()
    }

    async fn seeded(names: &[&str]) -> InMemoryRedemptionStore {
        let store = InMemoryRedemptionStore::new();
        for (i, name) in names.iter().enumerate() {
            store
                .create(&new_code(&format!("key-{:04}", i), name))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids_and_enabled_status() {
        let store = seeded(&["a", "b"]).await;
        let first = store.find_by_id(RedemptionId::from_i64(1)).await.unwrap().unwrap();
        let second = store.find_by_id(RedemptionId::from_i64(2)).await.unwrap().unwrap();

        assert_eq!(first.name, "a");
        assert_eq!(second.name, "b");
        assert_eq!(second.status, RedemptionStatus::Enabled);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_key() {
        let store = seeded(&["a"]).await;
        let err = store.create(&new_code("key-0000", "dup")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn list_is_newest_first_with_total() {
        let store = seeded(&["a", "b", "c", "d"]).await;
        let page = store.list(PageRequest::new(1, 2)).await.unwrap();

        assert_eq!(page.total, 4);
        let names: Vec<_> = page.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn list_hides_soft_deleted() {
        let store = seeded(&["a", "b"]).await;
        store.soft_delete(RedemptionId::from_i64(2)).await.unwrap();

        let page = store.list(PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "a");
        assert!(store.find_by_id(RedemptionId::from_i64(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn soft_delete_twice_is_not_found() {
        let store = seeded(&["a"]).await;
        store.soft_delete(RedemptionId::from_i64(1)).await.unwrap();
        let err = store.soft_delete(RedemptionId::from_i64(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RedemptionNotFound);
    }

    #[tokio::test]
    async fn search_numeric_matches_id_or_name_prefix() {
        let store = seeded(&["promo", "2024 launch", "other"]).await;
        let page = store
            .search(&SearchKeyword::parse("2"), PageRequest::default())
            .await
            .unwrap();

        // id 2 ("2024 launch") matches both ways and appears once
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, RedemptionId::from_i64(2));

        let page = store
            .search(&SearchKeyword::parse("1"), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "promo");
    }

    #[tokio::test]
    async fn search_text_matches_name_prefix_only() {
        let store = seeded(&["spring sale", "spring promo", "autumn spring"]).await;
        let page = store
            .search(&SearchKeyword::parse("spring"), PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        let names: Vec<_> = page.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["spring promo", "spring sale"]);
    }

    #[tokio::test]
    async fn update_applies_partial_edit() {
        let store = seeded(&["a"]).await;
        let update = RedemptionUpdate {
            name: Some("renamed".to_string()),
            status: Some(RedemptionStatus::Disabled),
            ..Default::default()
        };
        let updated = store.update(RedemptionId::from_i64(1), &update).await.unwrap();

        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.status, RedemptionStatus::Disabled);
        assert_eq!(updated.quota, 100);
        assert_eq!(
            store.find_by_key("key-0000").unwrap().status,
            RedemptionStatus::Disabled
        );
    }

    #[tokio::test]
    async fn update_rejects_marking_used() {
        let store = seeded(&["a"]).await;
        let update = RedemptionUpdate {
            status: Some(RedemptionStatus::Used),
            ..Default::default()
        };
        let err = store.update(RedemptionId::from_i64(1), &update).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = InMemoryRedemptionStore::new();
        let err = store
            .update(RedemptionId::from_i64(9), &RedemptionUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RedemptionNotFound);
    }

    #[tokio::test]
    async fn delete_invalid_removes_used_disabled_and_expired() {
        let store = seeded(&["live", "used", "disabled", "expired", "future"]).await;
        let now = Timestamp::now();

        let mut used = store.find_by_key("key-0001").unwrap();
        used.mark_used(UserId::new(1).unwrap(), now).unwrap();
        store.put(used);

        let mut disabled = store.find_by_key("key-0002").unwrap();
        disabled.status = RedemptionStatus::Disabled;
        store.put(disabled);

        let mut expired = store.find_by_key("key-0003").unwrap();
        expired.expires_at = Some(now.minus_secs(60));
        store.put(expired);

        let mut future = store.find_by_key("key-0004").unwrap();
        future.expires_at = Some(now.plus_secs(60));
        store.put(future);

        assert_eq!(store.delete_invalid(now).await.unwrap(), 3);
        assert_eq!(store.delete_invalid(now).await.unwrap(), 0);

        let remaining: Vec<_> = store
            .list(PageRequest::default())
            .await
            .unwrap()
            .items
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(remaining, vec!["future".to_string(), "live".to_string()]);
    }

    #[tokio::test]
    async fn soft_delete_waits_for_in_flight_transaction() {
        let store = seeded(&["locked"]).await;
        let key = RedemptionKey::new("key-0000").unwrap();

        let mut tx = store.begin().await.unwrap();
        let mut record = tx.lock_by_key(&key).await.unwrap().unwrap();

        let deleting = {
            let store = store.clone();
            tokio::spawn(async move { store.soft_delete(RedemptionId::from_i64(1)).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!deleting.is_finished());

        // The holder's write commits, then the delete proceeds.
        record.name = "renamed".to_string();
        tx.save_redemption(&record).await.unwrap();
        tx.commit().await.unwrap();

        deleting.await.unwrap().unwrap();
        let stored = store.state_for_helper().redemptions[&record.id].clone();
        assert_eq!(stored.name, "renamed");
        assert!(stored.is_deleted());
    }

    #[tokio::test]
    async fn idle_row_locks_are_pruned() {
        let store = InMemoryRedemptionStore::new();
        for i in 0..10 {
            let key = RedemptionKey::new(format!("missing-{:04}", i)).unwrap();
            let mut tx = store.begin().await.unwrap();
            assert!(tx.lock_by_key(&key).await.unwrap().is_none());
        }

        // Only the most recent entry can survive until the next acquire.
        assert!(store.row_locks.len() <= 1);

        let key = RedemptionKey::new("held-0001").unwrap();
        let _guard = store.row_locks.acquire(&key).await.unwrap();
        assert_eq!(store.row_locks.len(), 1);
    }
}
