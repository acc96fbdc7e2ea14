//! Redemption Service - single-use codes for wallet credit and plan activation
//!
//! A code is redeemed exactly once, under a row lock, inside one database
//! transaction: either the wallet is credited or a subscription is started,
//! the code is marked used, and nothing is visible until commit.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
