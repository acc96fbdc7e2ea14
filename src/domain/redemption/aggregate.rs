//! Redemption aggregate entity.
//!
//! A Redemption is a single-use code that grants either wallet quota or a
//! subscription plan. The record stores both a quota amount and a plan
//! reference; only one of them drives behavior (see [`Redemption::grant`]).
//!
//! # Design Decisions
//!
//! - **Expiry is read-time**: an expired code stays `Enabled` in storage and
//!   is rejected whenever it is presented
//! - **Soft delete**: `deleted_at` marks removal; stores filter on it explicitly
//! - **Redeem once**: `redeemed_at`/`used_user_id` are written together with
//!   the `Used` status and never again

use crate::domain::foundation::{
    PlanId, RedemptionId, StateMachine, Timestamp, UserId, ValidationError,
};
use serde::{Deserialize, Serialize};

use super::{RedeemError, RedemptionKey, RedemptionStatus};

/// Redemption aggregate - a single-use code.
///
/// # Invariants
///
/// - `redeemed_at` and `used_user_id` are `Some` iff `status == Used`
/// - `quota >= 0`
/// - a code whose `expires_at` has passed never becomes `Used`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    /// Store-assigned identifier.
    pub id: RedemptionId,

    /// Secret token presented by the redeemer.
    pub key: RedemptionKey,

    /// Current lifecycle status.
    pub status: RedemptionStatus,

    /// Display label.
    pub name: String,

    /// Wallet credit granted when no plan is attached.
    pub quota: i64,

    /// Subscription plan granted instead of quota.
    pub plan_id: Option<PlanId>,

    /// When the code was issued.
    pub created_at: Timestamp,

    /// Expiry instant; `None` never expires.
    pub expires_at: Option<Timestamp>,

    /// When the code was redeemed.
    pub redeemed_at: Option<Timestamp>,

    /// Who redeemed the code.
    pub used_user_id: Option<UserId>,

    /// Soft-delete marker.
    pub deleted_at: Option<Timestamp>,
}

/// What a redemption grants once it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionGrant {
    /// Credit the redeemer's wallet by this amount.
    Wallet { quota: i64 },

    /// Activate this subscription plan for the redeemer.
    Plan { plan_id: PlanId },
}

/// Input for issuing a new code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRedemption {
    pub key: RedemptionKey,
    pub name: String,
    pub quota: i64,
    pub plan_id: Option<PlanId>,
    pub expires_at: Option<Timestamp>,
}

impl NewRedemption {
    /// Creates issuance input, validating the quota.
    pub fn new(
        key: RedemptionKey,
        name: impl Into<String>,
        quota: i64,
        plan_id: Option<PlanId>,
        expires_at: Option<Timestamp>,
    ) -> Result<Self, ValidationError> {
        if quota < 0 {
            return Err(ValidationError::out_of_range("quota", 0, i64::MAX, quota));
        }
        Ok(Self {
            key,
            name: name.into(),
            quota,
            plan_id,
            expires_at,
        })
    }
}

/// Partial administrative edit. `None` leaves a field untouched.
///
/// `plan_id` and `expires_at` are doubly optional so an edit can clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedemptionUpdate {
    pub name: Option<String>,
    pub status: Option<RedemptionStatus>,
    pub quota: Option<i64>,
    pub plan_id: Option<Option<PlanId>>,
    pub expires_at: Option<Option<Timestamp>>,
}

impl Redemption {
    /// Builds the stored form of a freshly issued code.
    pub fn issue(id: RedemptionId, new: NewRedemption, created_at: Timestamp) -> Self {
        Self {
            id,
            key: new.key,
            status: RedemptionStatus::Enabled,
            name: new.name,
            quota: new.quota,
            plan_id: new.plan_id,
            created_at,
            expires_at: new.expires_at,
            redeemed_at: None,
            used_user_id: None,
            deleted_at: None,
        }
    }

    /// Returns true if the code has a set expiry strictly before `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at.is_before(&now))
    }

    /// Checks status then expiry, failing on the first violated condition.
    pub fn ensure_redeemable(&self, now: Timestamp) -> Result<(), RedeemError> {
        if !self.status.is_redeemable() {
            return Err(RedeemError::AlreadyUsed);
        }
        if self.is_expired_at(now) {
            return Err(RedeemError::Expired);
        }
        Ok(())
    }

    /// Returns what this code grants.
    ///
    /// A plan reference takes exclusive precedence: when both a plan and a
    /// positive quota are set, the quota is ignored.
    pub fn grant(&self) -> RedemptionGrant {
        match self.plan_id {
            Some(plan_id) => RedemptionGrant::Plan { plan_id },
            None => RedemptionGrant::Wallet { quota: self.quota },
        }
    }

    /// Consumes the code on behalf of `user_id`.
    pub fn mark_used(&mut self, user_id: UserId, now: Timestamp) -> Result<(), RedeemError> {
        self.ensure_redeemable(now)?;
        self.status = self
            .status
            .transition_to(RedemptionStatus::Used)
            .map_err(|_| RedeemError::AlreadyUsed)?;
        self.redeemed_at = Some(now);
        self.used_user_id = Some(user_id);
        Ok(())
    }

    /// Applies an administrative edit.
    ///
    /// Status may only move between `Enabled` and `Disabled`; a used code
    /// keeps its status.
    pub fn apply_update(&mut self, update: &RedemptionUpdate) -> Result<(), ValidationError> {
        if let Some(quota) = update.quota {
            if quota < 0 {
                return Err(ValidationError::out_of_range("quota", 0, i64::MAX, quota));
            }
        }
        if let Some(target) = update.status {
            if target == RedemptionStatus::Used {
                return Err(ValidationError::invalid_format(
                    "status",
                    "codes become used only through redemption",
                ));
            }
            if target != self.status {
                self.status = self.status.transition_to(target)?;
            }
        }
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(quota) = update.quota {
            self.quota = quota;
        }
        if let Some(plan_id) = update.plan_id {
            self.plan_id = plan_id;
        }
        if let Some(expires_at) = update.expires_at {
            self.expires_at = expires_at;
        }
        Ok(())
    }

    /// Returns true if the cleanup sweep should remove this code.
    pub fn is_eligible_for_cleanup(&self, now: Timestamp) -> bool {
        match self.status {
            RedemptionStatus::Used | RedemptionStatus::Disabled => true,
            RedemptionStatus::Enabled => self.is_expired_at(now),
        }
    }

    /// Returns true if the code has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
