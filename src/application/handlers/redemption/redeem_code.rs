//! RedeemCodeHandler - Command handler that exchanges a code for quota or a plan.
//!
//! The whole grant happens inside one [`RedemptionTransaction`]: the code's row
//! lock serializes concurrent redeemers, and the credit or subscription
//! commits together with the code becoming `Used`. Dropping the handler's
//! future at any await point drops the transaction and rolls it back.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::foundation::{DomainError, PlanId, RedemptionId, Timestamp, UserId};
use crate::domain::redemption::{RedeemError, RedemptionGrant, RedemptionKey};
use crate::domain::subscription::SubscriptionSource;
use crate::ports::{
    AuditEventType, AuditLog, GroupCache, QuotaLedger, RedemptionTransaction,
    SubscriptionProvisioner, TransactionProvider,
};

/// Default upper bound of the pre-transaction random delay.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(300);

/// Command to redeem a code on behalf of an authenticated user.
#[derive(Debug, Clone)]
pub struct RedeemCodeCommand {
    pub key: String,
    pub user_id: UserId,
}

/// What the redeemer received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedeemResult {
    /// Quota credited; 0 for plan redemptions.
    pub quota: i64,

    /// Activated plan; `None` for wallet redemptions.
    pub plan_id: Option<PlanId>,

    /// Activated plan's title; empty for wallet redemptions.
    pub plan_title: String,
}

/// Why the transactional part stopped early.
enum Abort {
    Business(RedeemError),
    System(DomainError),
}

impl From<DomainError> for Abort {
    fn from(err: DomainError) -> Self {
        Abort::System(err)
    }
}

/// A committed redemption plus what the post-commit steps need.
struct Committed {
    redemption_id: RedemptionId,
    result: RedeemResult,
    upgrade_group: Option<String>,
    audit_message: String,
}

/// Handler for redeeming codes.
pub struct RedeemCodeHandler<P: TransactionProvider> {
    transactions: Arc<P>,
    provisioner: Arc<dyn SubscriptionProvisioner<P::Transaction>>,
    ledger: Arc<dyn QuotaLedger<P::Transaction>>,
    group_cache: Arc<dyn GroupCache>,
    audit_log: Arc<dyn AuditLog>,
    max_jitter: Duration,
}

impl<P: TransactionProvider> RedeemCodeHandler<P> {
    pub fn new(
        transactions: Arc<P>,
        provisioner: Arc<dyn SubscriptionProvisioner<P::Transaction>>,
        ledger: Arc<dyn QuotaLedger<P::Transaction>>,
        group_cache: Arc<dyn GroupCache>,
        audit_log: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            transactions,
            provisioner,
            ledger,
            group_cache,
            audit_log,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }

    /// Sets the upper bound of the random delay. Zero disables it.
    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub async fn handle(&self, cmd: RedeemCodeCommand) -> Result<RedeemResult, RedeemError> {
        // 1. Reject malformed keys without touching the store
        let key = RedemptionKey::new(&cmd.key).map_err(|_| RedeemError::InvalidCode)?;

        // 2. Spread out bursts of identical requests
        self.jitter().await;

        // 3. Lock, validate, grant and finalize in one transaction
        let committed = match self.redeem_in_transaction(&key, cmd.user_id).await {
            Ok(committed) => committed,
            Err(Abort::Business(err)) => {
                debug!(key = %key.masked(), user_id = %cmd.user_id, reason = %err, "Redemption rejected");
                return Err(err);
            }
            Err(Abort::System(err)) => {
                error!(
                    key = %key.masked(),
                    user_id = %cmd.user_id,
                    error_code = %err.code,
                    "Redemption failed: {}",
                    err
                );
                return Err(RedeemError::Failed);
            }
        };

        info!(
            redemption_id = %committed.redemption_id,
            user_id = %cmd.user_id,
            quota = committed.result.quota,
            plan_id = ?committed.result.plan_id,
            "Redemption committed"
        );

        // 4. Best-effort notifications outside the critical section
        self.notify(cmd.user_id, &committed).await;

        Ok(committed.result)
    }

    async fn jitter(&self) {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return;
        }
        let delay_ms = rand::rng().random_range(0..=max_ms);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    async fn redeem_in_transaction(
        &self,
        key: &RedemptionKey,
        user_id: UserId,
    ) -> Result<Committed, Abort> {
        let mut tx = self.transactions.begin().await?;

        let mut redemption = tx
            .lock_by_key(key)
            .await?
            .ok_or(Abort::Business(RedeemError::InvalidCode))?;

        let now = Timestamp::now();
        redemption.ensure_redeemable(now).map_err(Abort::Business)?;

        let (result, upgrade_group, audit_message) = match redemption.grant() {
            RedemptionGrant::Plan { plan_id } => {
                let plan = tx
                    .find_plan(plan_id)
                    .await?
                    .ok_or(Abort::Business(RedeemError::InvalidPlan))?;

                self.provisioner
                    .create_from_plan(&mut tx, user_id, &plan, SubscriptionSource::Redemption)
                    .await?;

                let message = format!(
                    "Activated plan {} with redemption code {}",
                    plan.title, redemption.id
                );
                let group = plan.upgrade_group().map(str::to_string);
                let result = RedeemResult {
                    quota: 0,
                    plan_id: Some(plan.id),
                    plan_title: plan.title,
                };
                (result, group, message)
            }
            RedemptionGrant::Wallet { quota } => {
                self.ledger.adjust_relative(&mut tx, user_id, quota).await?;

                let message = format!(
                    "Topped up {} quota with redemption code {}",
                    quota, redemption.id
                );
                let result = RedeemResult {
                    quota,
                    plan_id: None,
                    plan_title: String::new(),
                };
                (result, None, message)
            }
        };

        redemption.mark_used(user_id, now).map_err(Abort::Business)?;
        tx.save_redemption(&redemption).await?;
        tx.commit().await?;

        Ok(Committed {
            redemption_id: redemption.id,
            result,
            upgrade_group,
            audit_message,
        })
    }

    async fn notify(&self, user_id: UserId, committed: &Committed) {
        if let Some(group) = &committed.upgrade_group {
            if let Err(err) = self.group_cache.refresh(user_id, group).await {
                warn!(user_id = %user_id, group = %group, "Failed to refresh group cache: {}", err);
            }
        }

        if let Err(err) = self
            .audit_log
            .record(user_id, AuditEventType::TopUp, &committed.audit_message)
            .await
        {
            warn!(user_id = %user_id, "Failed to record redemption audit entry: {}", err);
        }
    }
}
