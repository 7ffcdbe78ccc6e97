//! Active enum definitions mapping Postgres enums to Rust types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification (`account_kind` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_kind")]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Asset account.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability account.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity account.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue account.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense account.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<ledgra_core::account::AccountKind> for AccountKind {
    fn from(kind: ledgra_core::account::AccountKind) -> Self {
        use ledgra_core::account::AccountKind as Core;
        match kind {
            Core::Asset => Self::Asset,
            Core::Liability => Self::Liability,
            Core::Equity => Self::Equity,
            Core::Revenue => Self::Revenue,
            Core::Expense => Self::Expense,
        }
    }
}

impl From<AccountKind> for ledgra_core::account::AccountKind {
    fn from(kind: AccountKind) -> Self {
        use ledgra_core::account::AccountKind as Core;
        match kind {
            AccountKind::Asset => Core::Asset,
            AccountKind::Liability => Core::Liability,
            AccountKind::Equity => Core::Equity,
            AccountKind::Revenue => Core::Revenue,
            AccountKind::Expense => Core::Expense,
        }
    }
}

/// Journal entry status (`entry_status` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Drafted, not yet in the ledger.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Committed to the ledger.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Reversed by a later entry.
    #[sea_orm(string_value = "reversed")]
    Reversed,
}

impl From<ledgra_core::ledger::EntryStatus> for EntryStatus {
    fn from(status: ledgra_core::ledger::EntryStatus) -> Self {
        use ledgra_core::ledger::EntryStatus as Core;
        match status {
            Core::Draft => Self::Draft,
            Core::Posted => Self::Posted,
            Core::Reversed => Self::Reversed,
        }
    }
}

impl From<EntryStatus> for ledgra_core::ledger::EntryStatus {
    fn from(status: EntryStatus) -> Self {
        use ledgra_core::ledger::EntryStatus as Core;
        match status {
            EntryStatus::Draft => Core::Draft,
            EntryStatus::Posted => Core::Posted,
            EntryStatus::Reversed => Core::Reversed,
        }
    }
}

/// Business event source (`entry_source` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_source")]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Manually keyed entry.
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Sales posting.
    #[sea_orm(string_value = "sales")]
    Sales,
    /// Purchase posting.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Banking event.
    #[sea_orm(string_value = "banking")]
    Banking,
    /// Manufacturing cost finalization.
    #[sea_orm(string_value = "manufacturing")]
    Manufacturing,
}

impl From<ledgra_core::ledger::EntrySource> for EntrySource {
    fn from(source: ledgra_core::ledger::EntrySource) -> Self {
        use ledgra_core::ledger::EntrySource as Core;
        match source {
            Core::Manual => Self::Manual,
            Core::Sales => Self::Sales,
            Core::Purchase => Self::Purchase,
            Core::Banking => Self::Banking,
            Core::Manufacturing => Self::Manufacturing,
        }
    }
}

impl From<EntrySource> for ledgra_core::ledger::EntrySource {
    fn from(source: EntrySource) -> Self {
        use ledgra_core::ledger::EntrySource as Core;
        match source {
            EntrySource::Manual => Core::Manual,
            EntrySource::Sales => Core::Sales,
            EntrySource::Purchase => Core::Purchase,
            EntrySource::Banking => Core::Banking,
            EntrySource::Manufacturing => Core::Manufacturing,
        }
    }
}

/// Bank transaction reconciliation status (`bank_txn_status` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "bank_txn_status")]
#[serde(rename_all = "lowercase")]
pub enum BankTxnStatus {
    /// Not yet paired.
    #[sea_orm(string_value = "unmatched")]
    Unmatched,
    /// Paired with a ledger line.
    #[sea_orm(string_value = "matched")]
    Matched,
    /// Flagged for human review.
    #[sea_orm(string_value = "disputed")]
    Disputed,
}

impl From<ledgra_core::reconciliation::BankTxnStatus> for BankTxnStatus {
    fn from(status: ledgra_core::reconciliation::BankTxnStatus) -> Self {
        use ledgra_core::reconciliation::BankTxnStatus as Core;
        match status {
            Core::Unmatched => Self::Unmatched,
            Core::Matched => Self::Matched,
            Core::Disputed => Self::Disputed,
        }
    }
}

impl From<BankTxnStatus> for ledgra_core::reconciliation::BankTxnStatus {
    fn from(status: BankTxnStatus) -> Self {
        use ledgra_core::reconciliation::BankTxnStatus as Core;
        match status {
            BankTxnStatus::Unmatched => Core::Unmatched,
            BankTxnStatus::Matched => Core::Matched,
            BankTxnStatus::Disputed => Core::Disputed,
        }
    }
}

/// How a reconciliation match was made (`match_kind` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "match_kind")]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Exact match.
    #[sea_orm(string_value = "exact")]
    Exact,
    /// Fuzzy match awaiting confirmation.
    #[sea_orm(string_value = "fuzzy")]
    Fuzzy,
}

impl From<ledgra_core::reconciliation::MatchKind> for MatchKind {
    fn from(kind: ledgra_core::reconciliation::MatchKind) -> Self {
        use ledgra_core::reconciliation::MatchKind as Core;
        match kind {
            Core::Exact => Self::Exact,
            Core::Fuzzy => Self::Fuzzy,
        }
    }
}

impl From<MatchKind> for ledgra_core::reconciliation::MatchKind {
    fn from(kind: MatchKind) -> Self {
        use ledgra_core::reconciliation::MatchKind as Core;
        match kind {
            MatchKind::Exact => Core::Exact,
            MatchKind::Fuzzy => Core::Fuzzy,
        }
    }
}
