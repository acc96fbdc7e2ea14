//! Redemption command handlers.

mod cleanup_redemptions;
mod redeem_code;

pub use cleanup_redemptions::{
    CleanupRedemptionsCommand, CleanupRedemptionsHandler, CleanupRedemptionsResult,
};
pub use redeem_code::{RedeemCodeCommand, RedeemCodeHandler, RedeemResult, DEFAULT_MAX_JITTER};
