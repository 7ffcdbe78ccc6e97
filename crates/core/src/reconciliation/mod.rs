//! Bank statement reconciliation.
//!
//! Pairs imported bank transactions against committed ledger lines on the
//! bank account's GL account. The matcher is a pure function: it receives a
//! snapshot of transactions, candidate lines, and settings, and returns a
//! match outcome. Applying the outcome (and rolling it back on
//! cancellation) is the repository's job.

pub mod matcher;
pub mod types;

#[cfg(test)]
mod matcher_props;

pub use matcher::ReconciliationMatcher;
pub use types::{
    AmbiguousItem, BankTransactionRecord, BankTxnStatus, LedgerCandidate, MatchKind, MatchOutcome,
    MatchedItem, MatcherSettings,
};
