//! Report generation service.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{BalanceSheetReport, BalanceSheetSection, ProfitLossReport, ProfitLossSection};
use crate::account::AccountKind;
use crate::ledger::TrialBalanceRow;

/// Service for assembling financial reports from trial-balance rows.
pub struct ReportService;

impl ReportService {
    /// Assembles a profit & loss report from period trial-balance rows.
    ///
    /// Expects rows aggregated over the report period only (revenue and
    /// expense are flow measures, not balances).
    #[must_use]
    pub fn profit_loss(
        rows: Vec<TrialBalanceRow>,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> ProfitLossReport {
        let mut revenue = ProfitLossSection::default();
        let mut expenses = ProfitLossSection::default();

        for row in rows {
            match row.kind {
                AccountKind::Revenue => Self::add_to_pl_section(&mut revenue, row),
                AccountKind::Expense => Self::add_to_pl_section(&mut expenses, row),
                _ => {}
            }
        }

        let net_income = revenue.total - expenses.total;

        ProfitLossReport {
            period_start,
            period_end,
            revenue,
            expenses,
            net_income,
        }
    }

    /// Assembles a balance sheet from as-of trial-balance rows.
    ///
    /// Revenue and expense rows are folded into `current_earnings` so the
    /// statement balances without a period-close entry.
    #[must_use]
    pub fn balance_sheet(rows: Vec<TrialBalanceRow>, as_of: NaiveDate) -> BalanceSheetReport {
        let mut assets = BalanceSheetSection::default();
        let mut liabilities = BalanceSheetSection::default();
        let mut equity = BalanceSheetSection::default();
        let mut current_earnings = Decimal::ZERO;

        for row in rows {
            match row.kind {
                AccountKind::Asset => Self::add_to_bs_section(&mut assets, row),
                AccountKind::Liability => Self::add_to_bs_section(&mut liabilities, row),
                AccountKind::Equity => Self::add_to_bs_section(&mut equity, row),
                AccountKind::Revenue => current_earnings += row.balance(),
                AccountKind::Expense => current_earnings -= row.balance(),
            }
        }

        let liabilities_and_equity = liabilities.total + equity.total + current_earnings;

        BalanceSheetReport {
            as_of,
            is_balanced: assets.total == liabilities_and_equity,
            assets,
            liabilities,
            equity,
            current_earnings,
            liabilities_and_equity,
        }
    }

    fn add_to_pl_section(section: &mut ProfitLossSection, row: TrialBalanceRow) {
        section.total += row.balance();
        section.accounts.push(row);
    }

    fn add_to_bs_section(section: &mut BalanceSheetSection, row: TrialBalanceRow) {
        section.total += row.balance();
        section.accounts.push(row);
    }
}
