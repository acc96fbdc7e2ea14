//! HTTP adapters - REST API implementations.

pub mod redemption;

pub use redemption::{redemption_router, RedemptionAppState};
