//! Ledger domain types for journal entry creation and validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dimension::TagSet;
use ledgra_shared::types::Currency;

/// Business event source of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Manually keyed journal entry.
    Manual,
    /// Sales posting.
    Sales,
    /// Purchase posting.
    Purchase,
    /// Bank statement import or banking event.
    Banking,
    /// Manufacturing cost finalization.
    Manufacturing,
}

impl EntrySource {
    /// Stable string form used in the persisted schema and API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Sales => "sales",
            Self::Purchase => "purchase",
            Self::Banking => "banking",
            Self::Manufacturing => "manufacturing",
        }
    }
}

impl std::str::FromStr for EntrySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "sales" => Ok(Self::Sales),
            "purchase" => Ok(Self::Purchase),
            "banking" => Ok(Self::Banking),
            "manufacturing" => Ok(Self::Manufacturing),
            _ => Err(format!("Unknown entry source: {s}")),
        }
    }
}

/// Journal entry status.
///
/// Entries are append-only once committed: corrections happen via reversal
/// entries, never by mutating a posted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted and has not reached the ledger.
    Draft,
    /// Entry is committed to the ledger (immutable).
    Posted,
    /// Entry has been reversed by a later entry (immutable; lines remain).
    Reversed,
}

impl EntryStatus {
    /// Returns true if the entry is part of the permanent ledger.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }

    /// Stable string form used in the persisted schema and API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Reversed => "reversed",
        }
    }
}

/// Input for a single journal line.
///
/// Exactly one of `debit`/`credit` must be non-zero, and both must be
/// non-negative; the posting service enforces this.
#[derive(Debug, Clone)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: Uuid,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Line currency; must match the entry header's currency.
    pub currency: Currency,
    /// Optional memo for this line.
    pub memo: Option<String>,
    /// Dimension tags: dimension type ID -> dimension value ID.
    pub tags: TagSet,
}

/// Input for posting a new journal entry.
#[derive(Debug, Clone)]
pub struct JournalEntryInput {
    /// The posting date.
    pub posting_date: NaiveDate,
    /// A description of the entry.
    pub description: String,
    /// The business event source.
    pub source: EntrySource,
    /// The entry currency.
    pub currency: Currency,
    /// Optional reference (e.g. invoice number).
    pub reference: Option<String>,
    /// Caller-supplied idempotency key; a retried call with the same key
    /// returns the originally committed entry.
    pub idempotency_key: Option<String>,
    /// The journal lines.
    pub lines: Vec<JournalLineInput>,
    /// The caller posting the entry.
    pub created_by: Uuid,
}

/// Entry totals computed during validation.
#[derive(Debug, Clone)]
pub struct EntryTotals {
    /// Sum of all debit amounts.
    pub debit_total: Decimal,
    /// Sum of all credit amounts.
    pub credit_total: Decimal,
    /// Whether debits equal credits exactly.
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates entry totals from column sums.
    #[must_use]
    pub fn new(debit_total: Decimal, credit_total: Decimal) -> Self {
        Self {
            debit_total,
            credit_total,
            is_balanced: debit_total == credit_total,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit_total - self.credit_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_committed() {
        assert!(!EntryStatus::Draft.is_committed());
        assert!(EntryStatus::Posted.is_committed());
        assert!(EntryStatus::Reversed.is_committed());
    }

    #[test]
    fn test_source_round_trip() {
        for source in [
            EntrySource::Manual,
            EntrySource::Sales,
            EntrySource::Purchase,
            EntrySource::Banking,
            EntrySource::Manufacturing,
        ] {
            assert_eq!(EntrySource::from_str(source.as_str()).unwrap(), source);
        }
        assert!(EntrySource::from_str("payroll").is_err());
    }

    #[test]
    fn test_entry_totals() {
        let totals = EntryTotals::new(Decimal::new(10000, 2), Decimal::new(10000, 2));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);

        let totals = EntryTotals::new(Decimal::new(10000, 2), Decimal::new(5000, 2));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::new(5000, 2));
    }
}
