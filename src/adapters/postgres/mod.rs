//! PostgreSQL adapters.
//!
//! Every redemption port backed by sqlx. The engine's collaborators take
//! `&mut PgRedemptionTransaction` so their writes join the redemption's
//! transaction and row lock.

mod audit_log;
mod quota_ledger;
mod redemption_reader;
mod redemption_repository;
mod subscription_provisioner;
mod unit_of_work;

pub use audit_log::PostgresAuditLog;
pub use quota_ledger::PostgresQuotaLedger;
pub use redemption_reader::PostgresRedemptionReader;
pub use redemption_repository::PostgresRedemptionRepository;
pub use subscription_provisioner::PostgresSubscriptionProvisioner;
pub use unit_of_work::{PgRedemptionTransaction, PgTransactionProvider};
