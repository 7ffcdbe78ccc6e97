//! Account directory domain types.
//!
//! Accounts are long-lived reference data. Once a posted line references an
//! account, its code and kind are frozen by the repository layer; the engine
//! only reads them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Asset account (debit-normal).
    Asset,
    /// Liability account (credit-normal).
    Liability,
    /// Equity account (credit-normal).
    Equity,
    /// Revenue account (credit-normal).
    Revenue,
    /// Expense account (debit-normal).
    Expense,
}

impl AccountKind {
    /// The normal balance side for this kind of account.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Stable string form used in the persisted schema and API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account kind: {s}")),
        }
    }
}

/// Normal balance side of an account.
///
/// - Debit-normal (asset/expense): balance = debits - credits
/// - Credit-normal (liability/equity/revenue): balance = credits - debits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue).
    Credit,
}

impl NormalBalance {
    /// Calculates the signed balance of an account from its column totals.
    #[must_use]
    pub fn balance(self, debit_total: Decimal, credit_total: Decimal) -> Decimal {
        match self {
            Self::Debit => debit_total - credit_total,
            Self::Credit => credit_total - debit_total,
        }
    }
}

/// A chart-of-accounts entry as seen by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// The account ID.
    pub id: Uuid,
    /// Unique human-readable account code (e.g. "1000").
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account classification.
    pub kind: AccountKind,
    /// Dimension types every line on this account must carry.
    pub required_dimensions: Vec<Uuid>,
    /// Whether the account accepts new postings.
    pub is_active: bool,
}

impl AccountRecord {
    /// The normal balance side for this account.
    #[must_use]
    pub const fn normal_balance(&self) -> NormalBalance {
        self.kind.normal_balance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[rstest]
    #[case(AccountKind::Asset, NormalBalance::Debit)]
    #[case(AccountKind::Expense, NormalBalance::Debit)]
    #[case(AccountKind::Liability, NormalBalance::Credit)]
    #[case(AccountKind::Equity, NormalBalance::Credit)]
    #[case(AccountKind::Revenue, NormalBalance::Credit)]
    fn test_normal_balance(#[case] kind: AccountKind, #[case] expected: NormalBalance) {
        assert_eq!(kind.normal_balance(), expected);
    }

    #[test]
    fn test_debit_normal_balance() {
        // Debit increases, credit decreases
        assert_eq!(NormalBalance::Debit.balance(dec!(100), dec!(0)), dec!(100));
        assert_eq!(NormalBalance::Debit.balance(dec!(0), dec!(50)), dec!(-50));
        assert_eq!(NormalBalance::Debit.balance(dec!(100), dec!(30)), dec!(70));
    }

    #[test]
    fn test_credit_normal_balance() {
        assert_eq!(NormalBalance::Credit.balance(dec!(0), dec!(100)), dec!(100));
        assert_eq!(NormalBalance::Credit.balance(dec!(50), dec!(0)), dec!(-50));
        assert_eq!(NormalBalance::Credit.balance(dec!(30), dec!(100)), dec!(70));
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            AccountKind::Asset,
            AccountKind::Liability,
            AccountKind::Equity,
            AccountKind::Revenue,
            AccountKind::Expense,
        ] {
            assert_eq!(AccountKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(AccountKind::from_str("contra").is_err());
    }
}
