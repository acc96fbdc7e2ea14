//! Redemption error taxonomy.
//!
//! Two tiers: the four business rejections are deterministic and safe to show
//! to the redeemer verbatim; everything else collapses into `Failed`, whose
//! detail stays in the server logs.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidCode | 400 |
//! | AlreadyUsed | 400 |
//! | Expired | 400 |
//! | InvalidPlan | 400 |
//! | Failed | 500 |

use crate::domain::foundation::ErrorCode;
use thiserror::Error;

/// Outcome of a rejected or failed redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RedeemError {
    /// No live code matches the presented key.
    #[error("invalid redemption code")]
    InvalidCode,

    /// The code is used or disabled.
    #[error("redemption code has already been used")]
    AlreadyUsed,

    /// The code's expiry instant has passed.
    #[error("redemption code has expired")]
    Expired,

    /// The code references a subscription plan that does not exist.
    #[error("redemption code references an invalid subscription plan")]
    InvalidPlan,

    /// Any system fault. Details are logged, never returned.
    #[error("redemption failed")]
    Failed,
}

impl RedeemError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RedeemError::InvalidCode => ErrorCode::InvalidRedemptionCode,
            RedeemError::AlreadyUsed => ErrorCode::RedemptionAlreadyUsed,
            RedeemError::Expired => ErrorCode::RedemptionExpired,
            RedeemError::InvalidPlan => ErrorCode::InvalidPlan,
            RedeemError::Failed => ErrorCode::RedemptionFailed,
        }
    }

    /// Returns the message shown to the redeemer.
    pub fn user_message(&self) -> &'static str {
        match self {
            RedeemError::InvalidCode => "The redemption code is invalid",
            RedeemError::AlreadyUsed => "This redemption code has already been used",
            RedeemError::Expired => "This redemption code has expired",
            RedeemError::InvalidPlan => "The subscription plan for this code is not available",
            RedeemError::Failed => "Redemption failed, please try again later",
        }
    }

    /// Returns true for deterministic business rejections.
    pub fn is_business(&self) -> bool {
        !matches!(self, RedeemError::Failed)
    }
}
