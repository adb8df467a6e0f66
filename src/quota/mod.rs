//! Quota module for tracking the shared API budget
//!
//! The ledger is the only state shared between fetches. It is owned by the
//! crawl coordinator and lent as `&mut QuotaLedger` to every call that spends,
//! so debits happen one at a time and in a total order.

mod ledger;

pub use ledger::{LedgerError, QuotaLedger};

/// Quota units charged per listing request, independent of page size
pub const CALL_COST: u64 = 1;
