//! In-memory redemption transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, UserId};
use crate::domain::redemption::{Redemption, RedemptionKey};
use crate::domain::subscription::{SubscriptionPlan, UserSubscription};
use crate::ports::RedemptionTransaction;

use super::redemption_store::{lock_state, RowLocks, StoreState};

/// A write that becomes visible only on commit.
#[derive(Debug, Clone)]
enum StagedWrite {
    Redemption(Redemption),
    QuotaDelta { user_id: UserId, delta: i64 },
    Subscription(UserSubscription),
    UserGroup { user_id: UserId, group: String },
}

/// Transaction over an [`super::InMemoryRedemptionStore`].
///
/// Holds the row locks it acquired until it is committed or dropped.
/// Dropping it without committing discards every staged write.
pub struct InMemoryTransaction {
    state: Arc<Mutex<StoreState>>,
    row_locks: Arc<RowLocks>,
    held: HashMap<RedemptionKey, OwnedMutexGuard<()>>,
    staged: Vec<StagedWrite>,
}

impl InMemoryTransaction {
    pub(super) fn new(state: Arc<Mutex<StoreState>>, row_locks: Arc<RowLocks>) -> Self {
        Self {
            state,
            row_locks,
            held: HashMap::new(),
            staged: Vec::new(),
        }
    }

    /// Stages a relative balance change for an existing user.
    pub fn stage_quota_delta(&mut self, user_id: UserId, delta: i64) -> Result<(), DomainError> {
        self.ensure_user(user_id)?;
        self.staged.push(StagedWrite::QuotaDelta { user_id, delta });
        Ok(())
    }

    /// Stages a new subscription row.
    pub fn stage_subscription(&mut self, subscription: UserSubscription) -> Result<(), DomainError> {
        self.ensure_user(subscription.user_id)?;
        self.staged.push(StagedWrite::Subscription(subscription));
        Ok(())
    }

    /// Stages a change of the user's group.
    pub fn stage_user_group(&mut self, user_id: UserId, group: &str) -> Result<(), DomainError> {
        self.ensure_user(user_id)?;
        self.staged.push(StagedWrite::UserGroup {
            user_id,
            group: group.to_string(),
        });
        Ok(())
    }

    /// Number of writes waiting for commit.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    fn ensure_user(&self, user_id: UserId) -> Result<(), DomainError> {
        let state = lock_state(&self.state)?;
        if state.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User {} not found", user_id),
            ))
        }
    }

    /// Latest staged version of a record, if this transaction wrote it.
    fn staged_redemption(&self, key: &RedemptionKey) -> Option<&Redemption> {
        self.staged.iter().rev().find_map(|write| match write {
            StagedWrite::Redemption(r) if &r.key == key => Some(r),
            _ => None,
        })
    }
}

/// Checks a write against committed state without applying it.
fn check(state: &StoreState, write: &StagedWrite) -> Result<(), DomainError> {
    let user_missing = |user_id: &UserId| {
        DomainError::new(
            ErrorCode::UserNotFound,
            format!("User {} not found", user_id),
        )
    };
    match write {
        StagedWrite::Redemption(r) => match state.redemptions.get(&r.id) {
            Some(current) if !current.is_deleted() => Ok(()),
            _ => Err(DomainError::new(
                ErrorCode::RedemptionNotFound,
                format!("Redemption {} not found", r.id),
            )),
        },
        StagedWrite::QuotaDelta { user_id, .. } | StagedWrite::UserGroup { user_id, .. } => {
            if state.users.contains_key(user_id) {
                Ok(())
            } else {
                Err(user_missing(user_id))
            }
        }
        StagedWrite::Subscription(s) => {
            if state.users.contains_key(&s.user_id) {
                Ok(())
            } else {
                Err(user_missing(&s.user_id))
            }
        }
    }
}

/// Balances after every staged delta, or an error if one would overflow.
///
/// Computed before anything is applied so a failing commit leaves the store
/// untouched.
fn settled_quotas(
    state: &StoreState,
    staged: &[StagedWrite],
) -> Result<HashMap<UserId, i64>, DomainError> {
    let mut balances = HashMap::new();
    for write in staged {
        if let StagedWrite::QuotaDelta { user_id, delta } = write {
            let current = match balances.get(user_id) {
                Some(balance) => *balance,
                None => state.users.get(user_id).map_or(0, |user| user.quota),
            };
            let next = current.checked_add(*delta).ok_or_else(|| {
                DomainError::new(
                    ErrorCode::OutOfRange,
                    format!("Quota of user {} would overflow", user_id),
                )
            })?;
            balances.insert(*user_id, next);
        }
    }
    Ok(balances)
}

fn apply(state: &mut StoreState, write: StagedWrite) {
    match write {
        StagedWrite::Redemption(r) => {
            state.redemptions.insert(r.id, r);
        }
        // Balances are settled separately.
        StagedWrite::QuotaDelta { .. } => {}
        StagedWrite::Subscription(s) => state.subscriptions.push(s),
        StagedWrite::UserGroup { user_id, group } => {
            if let Some(user) = state.users.get_mut(&user_id) {
                user.group = Some(group);
            }
        }
    }
}

#[async_trait]
impl RedemptionTransaction for InMemoryTransaction {
    async fn lock_by_key(
        &mut self,
        key: &RedemptionKey,
    ) -> Result<Option<Redemption>, DomainError> {
        if !self.held.contains_key(key) {
            let guard = self.row_locks.acquire(key).await?;
            self.held.insert(key.clone(), guard);
        }

        if let Some(staged) = self.staged_redemption(key) {
            return Ok(Some(staged.clone()));
        }
        let state = lock_state(&self.state)?;
        Ok(state.find_live_by_key(key).cloned())
    }

    async fn find_plan(&mut self, plan_id: PlanId) -> Result<Option<SubscriptionPlan>, DomainError> {
        let state = lock_state(&self.state)?;
        Ok(state.plans.get(&plan_id).cloned())
    }

    async fn save_redemption(&mut self, redemption: &Redemption) -> Result<(), DomainError> {
        {
            let state = lock_state(&self.state)?;
            check(&state, &StagedWrite::Redemption(redemption.clone()))?;
        }
        self.staged.push(StagedWrite::Redemption(redemption.clone()));
        Ok(())
    }

    async fn commit(self) -> Result<(), DomainError> {
        let InMemoryTransaction {
            state,
            held,
            staged,
            ..
        } = self;

        {
            let mut state = lock_state(&state)?;
            for write in &staged {
                check(&state, write)?;
            }
            let balances = settled_quotas(&state, &staged)?;
            for write in staged {
                apply(&mut state, write);
            }
            for (user_id, quota) in balances {
                if let Some(user) = state.users.get_mut(&user_id) {
                    user.quota = quota;
                }
            }
        }

        // Row locks are released only after the writes are visible.
        drop(held);
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        Ok(())
    }
}
