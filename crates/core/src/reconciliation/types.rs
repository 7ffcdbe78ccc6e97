//! Reconciliation domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dimension::TagSet;
use ledgra_shared::config::ReconciliationConfig;

/// Reconciliation status of a bank transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankTxnStatus {
    /// Not yet paired with a ledger line.
    Unmatched,
    /// Paired with a ledger line.
    Matched,
    /// Flagged for human review.
    Disputed,
}

impl BankTxnStatus {
    /// Stable string form used in the persisted schema and API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unmatched => "unmatched",
            Self::Matched => "matched",
            Self::Disputed => "disputed",
        }
    }
}

/// An imported bank statement transaction.
#[derive(Debug, Clone)]
pub struct BankTransactionRecord {
    /// The transaction ID.
    pub id: Uuid,
    /// The bank account the statement belongs to.
    pub bank_account_id: Uuid,
    /// Statement date of the transaction.
    pub date: NaiveDate,
    /// Signed amount: positive for money in, negative for money out.
    pub amount: Decimal,
    /// Statement description.
    pub description: String,
    /// Statement reference, if any.
    pub reference: Option<String>,
    /// Current reconciliation status.
    pub status: BankTxnStatus,
}

/// A committed ledger line on the bank account's GL account, as a matching
/// candidate.
///
/// `amount` is signed from the bank's perspective: debit minus credit on
/// the (asset) GL bank account, so deposits are positive and payments
/// negative, matching the statement convention.
#[derive(Debug, Clone)]
pub struct LedgerCandidate {
    /// The journal line ID.
    pub line_id: Uuid,
    /// The owning journal entry.
    pub entry_id: Uuid,
    /// Posting date of the owning entry.
    pub posting_date: NaiveDate,
    /// Signed amount (debit - credit).
    pub amount: Decimal,
    /// Entry description.
    pub description: String,
    /// Entry reference, if any.
    pub reference: Option<String>,
    /// Dimension tags on the line.
    pub tags: TagSet,
}

/// How a match was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Same amount, close date, reference/description overlap.
    Exact,
    /// Same amount within the wide date window; needs manual confirmation.
    Fuzzy,
}

impl MatchKind {
    /// Stable string form used in the persisted schema and API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
        }
    }
}

/// A successful pairing of a bank transaction with a ledger line.
#[derive(Debug, Clone)]
pub struct MatchedItem {
    /// The matched bank transaction.
    pub transaction_id: Uuid,
    /// The matched ledger line.
    pub line_id: Uuid,
    /// How the match was made.
    pub kind: MatchKind,
    /// Confidence score in [0, 1].
    pub confidence: Decimal,
    /// True for exact matches; fuzzy matches await manual confirmation.
    pub auto_accepted: bool,
    /// True if the line's tags differ from the bank account's expected
    /// dimension mapping. Recorded, never blocks the match.
    pub dimension_mismatch: bool,
}

/// A bank transaction with two or more indistinguishable exact candidates.
///
/// Never auto-resolved; surfaced as a listed exception for a human
/// reviewer.
#[derive(Debug, Clone)]
pub struct AmbiguousItem {
    /// The bank transaction in question.
    pub transaction_id: Uuid,
    /// The tied candidate lines, ordered by line ID.
    pub candidate_line_ids: Vec<Uuid>,
}

/// The outcome of one matcher run over a statement snapshot.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Successful pairings.
    pub matched: Vec<MatchedItem>,
    /// Transactions with indistinguishable exact candidates.
    pub ambiguous: Vec<AmbiguousItem>,
    /// Transactions with no candidate at all.
    pub unmatched: Vec<Uuid>,
}

/// Settings for one matcher run.
///
/// Thresholds come from configuration and the expected tags from the bank
/// account's default dimension mapping; nothing here is hard-coded.
#[derive(Debug, Clone)]
pub struct MatcherSettings {
    /// Date window (days, each side) for exact matches.
    pub exact_date_window_days: i64,
    /// Date window (days, each side) for fuzzy matches.
    pub fuzzy_date_window_days: i64,
    /// Minimum token overlap for an exact match, in [0, 1].
    pub token_overlap_threshold: Decimal,
    /// The dimension tags expected on lines for this bank account.
    pub expected_tags: TagSet,
}

impl MatcherSettings {
    /// Builds matcher settings from the configuration snapshot plus the
    /// bank account's expected dimension mapping.
    #[must_use]
    pub fn from_config(config: &ReconciliationConfig, expected_tags: TagSet) -> Self {
        Self {
            exact_date_window_days: config.exact_date_window_days,
            fuzzy_date_window_days: config.fuzzy_date_window_days,
            token_overlap_threshold: config.token_overlap_threshold,
            expected_tags,
        }
    }
}
