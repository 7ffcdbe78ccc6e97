//! Property tests for ledger aggregation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::aggregation::{MaterializedLedger, PostedLine, live_account_totals, trial_balance};
use crate::account::AccountKind;
use crate::dimension::{DimensionFilter, TagSet};

/// A small fixed chart so generated lines cluster onto few accounts.
fn chart() -> Vec<(String, Uuid, AccountKind)> {
    vec![
        ("1000".to_string(), Uuid::from_u128(1), AccountKind::Asset),
        ("2000".to_string(), Uuid::from_u128(2), AccountKind::Liability),
        ("4000".to_string(), Uuid::from_u128(4), AccountKind::Revenue),
        ("5000".to_string(), Uuid::from_u128(5), AccountKind::Expense),
    ]
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for committed lines generated as balanced entries: each entry
/// picks two accounts and posts one debit and one credit of the same size.
fn balanced_history_strategy(max_entries: usize) -> impl Strategy<Value = Vec<PostedLine>> {
    prop::collection::vec(
        (amount_strategy(), 0usize..4, 0usize..4, 0u32..28),
        1..=max_entries,
    )
    .prop_map(|entries| {
        let chart = chart();
        let mut lines = Vec::with_capacity(entries.len() * 2);
        for (amount, debit_pick, credit_pick, day) in entries {
            let entry_id = Uuid::new_v4();
            let date = NaiveDate::from_ymd_opt(2026, 7, 1 + day % 28).unwrap();
            let debit_account = &chart[debit_pick % chart.len()];
            let credit_account = &chart[credit_pick % chart.len()];
            lines.push(PostedLine {
                entry_id,
                account_id: debit_account.1,
                account_code: debit_account.0.clone(),
                account_name: debit_account.0.clone(),
                account_kind: debit_account.2,
                posting_date: date,
                debit: amount,
                credit: Decimal::ZERO,
                tags: TagSet::new(),
            });
            lines.push(PostedLine {
                entry_id,
                account_id: credit_account.1,
                account_code: credit_account.0.clone(),
                account_name: credit_account.0.clone(),
                account_kind: credit_account.2,
                posting_date: date,
                debit: Decimal::ZERO,
                credit: amount,
                tags: TagSet::new(),
            });
        }
        lines
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The unfiltered trial balance of any balanced history nets to zero:
    /// grand debit total equals grand credit total for every as-of date.
    #[test]
    fn prop_global_balance_invariant(lines in balanced_history_strategy(20)) {
        let as_of = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        let tb = trial_balance(&lines, as_of, &DimensionFilter::new());
        prop_assert!(tb.is_balanced);
        prop_assert_eq!(tb.debit_total, tb.credit_total);
    }

    /// The global invariant holds for any mid-history cutoff too, because
    /// entries are atomic: either both sides are dated in scope or neither.
    #[test]
    fn prop_balance_invariant_any_cutoff(
        lines in balanced_history_strategy(20),
        day in 1u32..28,
    ) {
        let as_of = NaiveDate::from_ymd_opt(2026, 7, day).unwrap();
        let tb = trial_balance(&lines, as_of, &DimensionFilter::new());
        prop_assert_eq!(tb.debit_total, tb.credit_total);
    }

    /// Materialized running totals always agree with a live full scan.
    #[test]
    fn prop_materialized_agrees_with_live(lines in balanced_history_strategy(20)) {
        let mut materialized = MaterializedLedger::new();
        materialized.apply_lines(&lines);
        prop_assert_eq!(materialized.account_totals(), &live_account_totals(&lines));
    }

    /// Incremental application commutes with batch application: applying
    /// entries one at a time yields the same totals as applying the whole
    /// history at once.
    #[test]
    fn prop_materialized_incremental_equals_batch(lines in balanced_history_strategy(20)) {
        let mut incremental = MaterializedLedger::new();
        for line in &lines {
            incremental.apply_line(line.account_id, line.debit, line.credit);
        }
        let mut batch = MaterializedLedger::new();
        batch.apply_lines(&lines);
        prop_assert_eq!(incremental.account_totals(), batch.account_totals());
    }

    /// Aggregation is order-independent: scanning lines in reverse produces
    /// the identical trial balance, row for row.
    #[test]
    fn prop_trial_balance_order_independent(lines in balanced_history_strategy(20)) {
        let as_of = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        let forward = trial_balance(&lines, as_of, &DimensionFilter::new());
        let mut reversed_input = lines;
        reversed_input.reverse();
        let backward = trial_balance(&reversed_input, as_of, &DimensionFilter::new());

        prop_assert_eq!(forward.rows.len(), backward.rows.len());
        for (a, b) in forward.rows.iter().zip(&backward.rows) {
            prop_assert_eq!(a.account_id, b.account_id);
            prop_assert_eq!(&a.code, &b.code);
            prop_assert_eq!(a.debit_total, b.debit_total);
            prop_assert_eq!(a.credit_total, b.credit_total);
        }
    }

    /// Rows come out ordered by account code ascending.
    #[test]
    fn prop_rows_ordered_by_code(lines in balanced_history_strategy(20)) {
        let as_of = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        let tb = trial_balance(&lines, as_of, &DimensionFilter::new());
        for pair in tb.rows.windows(2) {
            prop_assert!(pair[0].code < pair[1].code);
        }
    }
}
