//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::TrialBalanceRow;

/// A section of accounts within a report, with a netted total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfitLossSection {
    /// Netted section total (on the section's normal side).
    pub total: Decimal,
    /// Accounts in this section, ordered by code.
    pub accounts: Vec<TrialBalanceRow>,
}

/// Profit & loss report over a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitLossReport {
    /// Period start date.
    pub period_start: NaiveDate,
    /// Period end date.
    pub period_end: NaiveDate,
    /// Revenue accounts.
    pub revenue: ProfitLossSection,
    /// Expense accounts.
    pub expenses: ProfitLossSection,
    /// Revenue minus expenses.
    pub net_income: Decimal,
}

/// A section of the balance sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheetSection {
    /// Netted section total (on the section's normal side).
    pub total: Decimal,
    /// Accounts in this section, ordered by code.
    pub accounts: Vec<TrialBalanceRow>,
}

/// Balance sheet report as of a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Assets section.
    pub assets: BalanceSheetSection,
    /// Liabilities section.
    pub liabilities: BalanceSheetSection,
    /// Equity section.
    pub equity: BalanceSheetSection,
    /// Retained earnings to date: revenue minus expenses over all history
    /// in scope, shown with equity so the statement balances.
    pub current_earnings: Decimal,
    /// Liabilities + equity + current earnings.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}
