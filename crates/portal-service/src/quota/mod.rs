//! Per-principal upload quota.

pub mod guard;
pub mod ledger;

pub use guard::QuotaCharge;
pub use ledger::QuotaLedger;
