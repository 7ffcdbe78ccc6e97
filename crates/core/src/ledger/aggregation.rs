//! Ledger aggregation: trial balances and dimensional summaries.
//!
//! Aggregation scans committed lines (entries with status posted or
//! reversed; a reversed entry's lines stay in the ledger and are cancelled
//! by its reversal entry). Debit and credit columns are summed
//! independently and never netted here; netting happens only at
//! presentation. Output ordering is by account code or dimension value code
//! so identical inputs always produce identical reports.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::account::AccountKind;
use crate::dimension::{DimensionFilter, TagSet};

/// A committed journal line joined with its account, as scanned by reports.
#[derive(Debug, Clone)]
pub struct PostedLine {
    /// The owning entry.
    pub entry_id: Uuid,
    /// The account posted to.
    pub account_id: Uuid,
    /// Account code (orders trial balance rows).
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account classification.
    pub account_kind: AccountKind,
    /// Posting date of the owning entry.
    pub posting_date: NaiveDate,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Dimension tags.
    pub tags: TagSet,
}

/// One account row of a trial balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// The account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account classification.
    pub kind: AccountKind,
    /// Total debits.
    pub debit_total: Decimal,
    /// Total credits.
    pub credit_total: Decimal,
}

impl TrialBalanceRow {
    /// Net balance on the account's normal side. Presentation only.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.kind
            .normal_balance()
            .balance(self.debit_total, self.credit_total)
    }
}

/// A trial balance: per-account column totals plus grand totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    /// The as-of date the balance was computed for.
    pub as_of: NaiveDate,
    /// Rows ordered by account code ascending.
    pub rows: Vec<TrialBalanceRow>,
    /// Grand total of debits.
    pub debit_total: Decimal,
    /// Grand total of credits.
    pub credit_total: Decimal,
    /// Whether total debits equal total credits.
    pub is_balanced: bool,
}

/// Computes a trial balance over committed lines dated on or before `as_of`.
///
/// With an empty filter the grand totals always balance; a dimension filter
/// can legitimately unbalance them (it cuts across entries).
#[must_use]
pub fn trial_balance(
    lines: &[PostedLine],
    as_of: NaiveDate,
    filter: &DimensionFilter,
) -> TrialBalance {
    // Keyed by (code, id): BTreeMap iteration gives code-ascending order.
    let mut grouped: BTreeMap<(String, Uuid), TrialBalanceRow> = BTreeMap::new();

    for line in lines {
        if line.posting_date > as_of || !filter.matches(&line.tags) {
            continue;
        }
        let row = grouped
            .entry((line.account_code.clone(), line.account_id))
            .or_insert_with(|| TrialBalanceRow {
                account_id: line.account_id,
                code: line.account_code.clone(),
                name: line.account_name.clone(),
                kind: line.account_kind,
                debit_total: Decimal::ZERO,
                credit_total: Decimal::ZERO,
            });
        row.debit_total += line.debit;
        row.credit_total += line.credit;
    }

    let rows: Vec<TrialBalanceRow> = grouped.into_values().collect();
    let debit_total: Decimal = rows.iter().map(|r| r.debit_total).sum();
    let credit_total: Decimal = rows.iter().map(|r| r.credit_total).sum();

    TrialBalance {
        as_of,
        is_balanced: debit_total == credit_total,
        rows,
        debit_total,
        credit_total,
    }
}

/// One row of a dimensional summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionalSummaryRow {
    /// The dimension value, or `None` for the untagged bucket.
    pub value_id: Option<Uuid>,
    /// Dimension value code (orders the rows; untagged sorts last).
    pub value_code: String,
    /// Dimension value name.
    pub value_name: String,
    /// Total debits.
    pub debit_total: Decimal,
    /// Total credits.
    pub credit_total: Decimal,
}

/// Code shown for the untagged bucket.
pub const UNTAGGED_CODE: &str = "(untagged)";

/// Summarizes committed lines in `[from, to]` by the values of one
/// dimension type.
///
/// `value_lookup` resolves a dimension value ID to its (code, name). Rows
/// are ordered by value code ascending; lines without a tag of the
/// requested type land in a trailing untagged bucket when
/// `include_untagged` is set, and are dropped otherwise.
#[must_use]
pub fn dimensional_summary<L>(
    lines: &[PostedLine],
    from: NaiveDate,
    to: NaiveDate,
    dimension_type_id: Uuid,
    include_untagged: bool,
    value_lookup: L,
) -> Vec<DimensionalSummaryRow>
where
    L: Fn(Uuid) -> Option<(String, String)>,
{
    let mut grouped: BTreeMap<(String, Uuid), DimensionalSummaryRow> = BTreeMap::new();
    let mut untagged: Option<DimensionalSummaryRow> = None;

    for line in lines {
        if line.posting_date < from || line.posting_date > to {
            continue;
        }
        match line.tags.get(&dimension_type_id) {
            Some(&value_id) => {
                let (code, name) = value_lookup(value_id)
                    .unwrap_or_else(|| (value_id.to_string(), String::new()));
                let row = grouped
                    .entry((code.clone(), value_id))
                    .or_insert_with(|| DimensionalSummaryRow {
                        value_id: Some(value_id),
                        value_code: code,
                        value_name: name,
                        debit_total: Decimal::ZERO,
                        credit_total: Decimal::ZERO,
                    });
                row.debit_total += line.debit;
                row.credit_total += line.credit;
            }
            None if include_untagged => {
                let row = untagged.get_or_insert_with(|| DimensionalSummaryRow {
                    value_id: None,
                    value_code: UNTAGGED_CODE.to_string(),
                    value_name: String::new(),
                    debit_total: Decimal::ZERO,
                    credit_total: Decimal::ZERO,
                });
                row.debit_total += line.debit;
                row.credit_total += line.credit;
            }
            None => {}
        }
    }

    let mut rows: Vec<DimensionalSummaryRow> = grouped.into_values().collect();
    if let Some(row) = untagged {
        rows.push(row);
    }
    rows
}

/// Per-account column totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// Total debits.
    pub debit_total: Decimal,
    /// Total credits.
    pub credit_total: Decimal,
}

/// Materialized running totals per account.
///
/// The posting repository maintains the persisted equivalent inside the
/// commit transaction; this in-memory form exists so the materialized mode
/// can be checked against the live scan. The two must always agree.
#[derive(Debug, Clone, Default)]
pub struct MaterializedLedger {
    totals: BTreeMap<Uuid, AccountTotals>,
}

impl MaterializedLedger {
    /// Creates an empty materialized ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one committed line.
    pub fn apply_line(&mut self, account_id: Uuid, debit: Decimal, credit: Decimal) {
        let totals = self.totals.entry(account_id).or_default();
        totals.debit_total += debit;
        totals.credit_total += credit;
    }

    /// Applies every line of a committed entry.
    pub fn apply_lines<'a, I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = &'a PostedLine>,
    {
        for line in lines {
            self.apply_line(line.account_id, line.debit, line.credit);
        }
    }

    /// Returns the totals for one account (zero if never posted to).
    #[must_use]
    pub fn totals_for(&self, account_id: Uuid) -> AccountTotals {
        self.totals.get(&account_id).copied().unwrap_or_default()
    }

    /// Returns all per-account totals, ordered by account ID.
    #[must_use]
    pub const fn account_totals(&self) -> &BTreeMap<Uuid, AccountTotals> {
        &self.totals
    }
}

/// Computes per-account totals with a full scan. The reference the
/// materialized mode is checked against.
#[must_use]
pub fn live_account_totals(lines: &[PostedLine]) -> BTreeMap<Uuid, AccountTotals> {
    let mut totals: BTreeMap<Uuid, AccountTotals> = BTreeMap::new();
    for line in lines {
        let t = totals.entry(line.account_id).or_default();
        t.debit_total += line.debit;
        t.credit_total += line.credit;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn posted_line(
        account: (&str, Uuid, AccountKind),
        date: NaiveDate,
        debit: Decimal,
        credit: Decimal,
    ) -> PostedLine {
        PostedLine {
            entry_id: Uuid::new_v4(),
            account_id: account.1,
            account_code: account.0.to_string(),
            account_name: account.0.to_string(),
            account_kind: account.2,
            posting_date: date,
            debit,
            credit,
            tags: TagSet::new(),
        }
    }

    #[test]
    fn test_trial_balance_groups_and_orders_by_code() {
        let cash = ("1000", Uuid::new_v4(), AccountKind::Asset);
        let sales = ("4000", Uuid::new_v4(), AccountKind::Revenue);
        let date = ymd(2026, 7, 1);

        let lines = vec![
            posted_line(sales, date, dec!(0), dec!(1000.00)),
            posted_line(cash, date, dec!(1000.00), dec!(0)),
            posted_line(cash, date, dec!(250.00), dec!(0)),
            posted_line(sales, date, dec!(0), dec!(250.00)),
        ];

        let tb = trial_balance(&lines, date, &DimensionFilter::new());
        assert_eq!(tb.rows.len(), 2);
        assert_eq!(tb.rows[0].code, "1000");
        assert_eq!(tb.rows[0].debit_total, dec!(1250.00));
        assert_eq!(tb.rows[0].credit_total, dec!(0));
        assert_eq!(tb.rows[1].code, "4000");
        assert_eq!(tb.rows[1].credit_total, dec!(1250.00));
        assert!(tb.is_balanced);
    }

    #[test]
    fn test_trial_balance_respects_as_of() {
        let cash = ("1000", Uuid::new_v4(), AccountKind::Asset);
        let sales = ("4000", Uuid::new_v4(), AccountKind::Revenue);

        let lines = vec![
            posted_line(cash, ymd(2026, 7, 1), dec!(100.00), dec!(0)),
            posted_line(sales, ymd(2026, 7, 1), dec!(0), dec!(100.00)),
            posted_line(cash, ymd(2026, 8, 1), dec!(50.00), dec!(0)),
            posted_line(sales, ymd(2026, 8, 1), dec!(0), dec!(50.00)),
        ];

        let tb = trial_balance(&lines, ymd(2026, 7, 31), &DimensionFilter::new());
        assert_eq!(tb.debit_total, dec!(100.00));
        assert_eq!(tb.credit_total, dec!(100.00));
    }

    #[test]
    fn test_trial_balance_does_not_net_columns() {
        let cash = ("1000", Uuid::new_v4(), AccountKind::Asset);
        let date = ymd(2026, 7, 1);

        let lines = vec![
            posted_line(cash, date, dec!(100.00), dec!(0)),
            posted_line(cash, date, dec!(0), dec!(40.00)),
        ];

        let tb = trial_balance(&lines, date, &DimensionFilter::new());
        // Columns stay separate; netting is presentation-side via balance().
        assert_eq!(tb.rows[0].debit_total, dec!(100.00));
        assert_eq!(tb.rows[0].credit_total, dec!(40.00));
        assert_eq!(tb.rows[0].balance(), dec!(60.00));
    }

    #[test]
    fn test_trial_balance_dimension_filter() {
        let cash = ("1000", Uuid::new_v4(), AccountKind::Asset);
        let date = ymd(2026, 7, 1);
        let cost_center = Uuid::new_v4();
        let cc01 = Uuid::new_v4();

        let mut tagged = posted_line(cash, date, dec!(100.00), dec!(0));
        tagged.tags.insert(cost_center, cc01);
        let untagged = posted_line(cash, date, dec!(30.00), dec!(0));

        let filter = DimensionFilter::new().with_value(cc01);
        let tb = trial_balance(&[tagged, untagged], date, &filter);
        assert_eq!(tb.rows[0].debit_total, dec!(100.00));
    }

    #[test]
    fn test_dimensional_summary_orders_by_value_code() {
        let cash = ("1000", Uuid::new_v4(), AccountKind::Asset);
        let date = ymd(2026, 7, 10);
        let cost_center = Uuid::new_v4();
        let cc01 = Uuid::new_v4();
        let cc02 = Uuid::new_v4();

        let mut a = posted_line(cash, date, dec!(10.00), dec!(0));
        a.tags.insert(cost_center, cc02);
        let mut b = posted_line(cash, date, dec!(20.00), dec!(0));
        b.tags.insert(cost_center, cc01);
        let untagged = posted_line(cash, date, dec!(5.00), dec!(0));

        let lookup = move |id: Uuid| {
            if id == cc01 {
                Some(("CC-01".to_string(), "Head office".to_string()))
            } else if id == cc02 {
                Some(("CC-02".to_string(), "Warehouse".to_string()))
            } else {
                None
            }
        };

        let rows = dimensional_summary(
            &[a, b, untagged],
            date,
            date,
            cost_center,
            true,
            lookup,
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].value_code, "CC-01");
        assert_eq!(rows[0].debit_total, dec!(20.00));
        assert_eq!(rows[1].value_code, "CC-02");
        assert_eq!(rows[2].value_code, UNTAGGED_CODE);
        assert_eq!(rows[2].debit_total, dec!(5.00));
    }

    #[test]
    fn test_dimensional_summary_drops_untagged_when_excluded() {
        let cash = ("1000", Uuid::new_v4(), AccountKind::Asset);
        let date = ymd(2026, 7, 10);
        let cost_center = Uuid::new_v4();

        let untagged = posted_line(cash, date, dec!(5.00), dec!(0));
        let rows = dimensional_summary(&[untagged], date, date, cost_center, false, |_| None);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_materialized_agrees_with_live() {
        let cash = ("1000", Uuid::new_v4(), AccountKind::Asset);
        let sales = ("4000", Uuid::new_v4(), AccountKind::Revenue);
        let date = ymd(2026, 7, 1);

        let lines = vec![
            posted_line(cash, date, dec!(100.00), dec!(0)),
            posted_line(sales, date, dec!(0), dec!(100.00)),
            posted_line(cash, date, dec!(0), dec!(25.00)),
            posted_line(sales, date, dec!(25.00), dec!(0)),
        ];

        let mut materialized = MaterializedLedger::new();
        materialized.apply_lines(&lines);

        assert_eq!(*materialized.account_totals(), live_account_totals(&lines));
        assert_eq!(
            materialized.totals_for(cash.1),
            AccountTotals {
                debit_total: dec!(100.00),
                credit_total: dec!(25.00),
            }
        );
    }
}
