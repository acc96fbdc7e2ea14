//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Transactional Ports
//!
//! - `TransactionProvider` / `RedemptionTransaction` - Scoped unit of work with row locks
//! - `SubscriptionProvisioner` - Plan activation joined to the caller's transaction
//! - `QuotaLedger` - Relative wallet adjustment joined to the caller's transaction
//!
//! ## Post-commit Ports
//!
//! - `GroupCache` - User group cache refresh
//! - `AuditLog` - User-visible account event log
//!
//! ## Admin Ports
//!
//! - `RedemptionRepository` - Code issuance, edits, soft delete and cleanup
//! - `RedemptionReader` - Paged listing and search

mod audit_log;
mod group_cache;
mod quota_ledger;
mod redemption_reader;
mod redemption_repository;
mod subscription_provisioner;
mod unit_of_work;

pub use audit_log::{AuditEventType, AuditLog};
pub use group_cache::GroupCache;
pub use quota_ledger::QuotaLedger;
pub use redemption_reader::{Page, PageRequest, RedemptionReader, MAX_PAGE_SIZE};
pub use redemption_repository::RedemptionRepository;
pub use subscription_provisioner::SubscriptionProvisioner;
pub use unit_of_work::{RedemptionTransaction, TransactionProvider};
