//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx-backed transactions, repository, reader, ledger and audit log
//! - `cache` - Redis group cache
//! - `http` - axum routes for redeeming codes
//! - `memory` - In-memory implementations for tests and local runs

pub mod cache;
pub mod http;
pub mod memory;
pub mod postgres;
