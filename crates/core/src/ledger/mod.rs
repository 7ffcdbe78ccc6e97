//! Double-entry posting, reversal, and aggregation.
//!
//! This module implements the core ledger functionality:
//! - Domain types for journal entry creation
//! - Structural, balance, and dimension validation
//! - Reversal entry construction
//! - Trial balance and dimensional aggregation
//! - Error types for posting operations

pub mod aggregation;
pub mod error;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod aggregation_props;
#[cfg(test)]
mod service_props;

pub use aggregation::{
    DimensionalSummaryRow, MaterializedLedger, PostedLine, TrialBalance, TrialBalanceRow,
    dimensional_summary, trial_balance,
};
pub use error::PostingError;
pub use reversal::{PostedLineView, ReversalBuild, ReversalService};
pub use service::{AccountView, PostingService};
pub use types::{EntrySource, EntryStatus, EntryTotals, JournalEntryInput, JournalLineInput};
