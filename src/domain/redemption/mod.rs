//! Redemption domain module.
//!
//! Single-use codes exchanged for wallet quota or a subscription plan.
//!
//! # Module Structure
//!
//! - `aggregate` - Redemption aggregate and its admin edit/issue inputs
//! - `status` - RedemptionStatus state machine
//! - `key` - RedemptionKey secret token
//! - `errors` - RedeemError business/system taxonomy
//! - `search` - Admin keyword search classification

mod aggregate;
mod errors;
mod key;
mod search;
mod status;

pub use aggregate::{NewRedemption, Redemption, RedemptionGrant, RedemptionUpdate};
pub use errors::RedeemError;
pub use key::{RedemptionKey, MAX_KEY_LEN};
pub use search::SearchKeyword;
pub use status::RedemptionStatus;
