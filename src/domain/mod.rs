//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `redemption` - Redemption code aggregate, status lifecycle and error taxonomy
//! - `subscription` - Subscription plans and user subscriptions created by redemption

pub mod foundation;
pub mod redemption;
pub mod subscription;
