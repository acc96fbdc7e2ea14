//! In-process adapters.
//!
//! Implement every redemption port against shared in-memory state with the
//! same locking and rollback semantics as the PostgreSQL adapters:
//!
//! - row locks are per-key async mutexes held by the transaction
//! - writes are staged on the transaction and applied atomically on commit
//! - dropping a transaction discards its staged writes and releases its locks
//!
//! Used by the test suites and for single-node development.

mod audit_log;
mod group_cache;
mod quota_ledger;
mod redemption_store;
mod subscription_provisioner;
mod transaction;

pub use audit_log::{AuditEntry, InMemoryAuditLog};
pub use group_cache::InMemoryGroupCache;
pub use quota_ledger::InMemoryQuotaLedger;
pub use redemption_store::InMemoryRedemptionStore;
pub use subscription_provisioner::InMemorySubscriptionProvisioner;
pub use transaction::InMemoryTransaction;
