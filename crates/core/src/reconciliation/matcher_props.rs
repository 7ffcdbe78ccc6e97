//! Property tests for the reconciliation matcher.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use uuid::Uuid;

use super::matcher::ReconciliationMatcher;
use super::types::{
    BankTransactionRecord, BankTxnStatus, LedgerCandidate, MatchOutcome, MatcherSettings,
};
use crate::dimension::TagSet;

const DESCRIPTIONS: &[&str] = &[
    "ACME supplies invoice",
    "Globex monthly rental",
    "payroll transfer",
    "card settlement batch",
    "utility direct debit",
];

fn settings() -> MatcherSettings {
    MatcherSettings {
        exact_date_window_days: 3,
        fuzzy_date_window_days: 14,
        token_overlap_threshold: Decimal::new(5, 1),
        expected_tags: TagSet::new(),
    }
}

/// Strategy for a statement snapshot: transactions and candidate lines
/// drawn from the same small pool of amounts/dates/wordings so collisions
/// (the interesting cases) are common.
#[allow(clippy::type_complexity)]
fn snapshot_strategy()
-> impl Strategy<Value = (Vec<BankTransactionRecord>, Vec<LedgerCandidate>)> {
    let txn = (1u32..20, 0usize..5, -500i64..500, 1u128..1000).prop_map(
        |(day, desc, amount, id)| BankTransactionRecord {
            id: Uuid::from_u128(id),
            bank_account_id: Uuid::from_u128(1),
            date: NaiveDate::from_ymd_opt(2025, 10, day.clamp(1, 28)).unwrap(),
            amount: Decimal::new(amount * 100 + 50, 2),
            description: DESCRIPTIONS[desc].to_string(),
            reference: None,
            status: BankTxnStatus::Unmatched,
        },
    );
    let line = (1u32..20, 0usize..5, -500i64..500, 1000u128..2000).prop_map(
        |(day, desc, amount, id)| LedgerCandidate {
            line_id: Uuid::from_u128(id),
            entry_id: Uuid::from_u128(id + 10_000),
            posting_date: NaiveDate::from_ymd_opt(2025, 10, day.clamp(1, 28)).unwrap(),
            amount: Decimal::new(amount * 100 + 50, 2),
            description: DESCRIPTIONS[desc].to_string(),
            reference: None,
            tags: TagSet::new(),
        },
    );
    (
        prop::collection::vec(txn, 0..15),
        prop::collection::vec(line, 0..15),
    )
}

fn dedup_snapshot(
    mut transactions: Vec<BankTransactionRecord>,
    mut candidates: Vec<LedgerCandidate>,
) -> (Vec<BankTransactionRecord>, Vec<LedgerCandidate>) {
    let mut seen = BTreeSet::new();
    transactions.retain(|t| seen.insert(t.id));
    let mut seen = BTreeSet::new();
    candidates.retain(|c| seen.insert(c.line_id));
    (transactions, candidates)
}

fn outcome_key(outcome: &MatchOutcome) -> Vec<(Uuid, Uuid, Decimal, bool)> {
    let mut key: Vec<(Uuid, Uuid, Decimal, bool)> = outcome
        .matched
        .iter()
        .map(|m| (m.transaction_id, m.line_id, m.confidence, m.auto_accepted))
        .collect();
    key.sort();
    key
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Shuffling the input order changes nothing: the match set, confidence
    /// scores, ambiguities, and exceptions are identical.
    #[test]
    fn prop_matcher_is_order_independent(
        (transactions, candidates) in snapshot_strategy(),
    ) {
        let (transactions, candidates) = dedup_snapshot(transactions, candidates);
        let forward =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());

        let mut shuffled_txns = transactions.clone();
        shuffled_txns.reverse();
        let mut shuffled_candidates = candidates.clone();
        shuffled_candidates.reverse();
        let backward = ReconciliationMatcher::match_statement(
            &shuffled_txns,
            &shuffled_candidates,
            &settings(),
        );

        prop_assert_eq!(outcome_key(&forward), outcome_key(&backward));

        let mut forward_unmatched = forward.unmatched.clone();
        forward_unmatched.sort();
        let mut backward_unmatched = backward.unmatched.clone();
        backward_unmatched.sort();
        prop_assert_eq!(forward_unmatched, backward_unmatched);
        prop_assert_eq!(forward.ambiguous.len(), backward.ambiguous.len());
    }

    /// No ledger line is ever consumed twice, and no transaction appears in
    /// more than one bucket of the outcome.
    #[test]
    fn prop_at_most_one_match_per_line_and_txn(
        (transactions, candidates) in snapshot_strategy(),
    ) {
        let (transactions, candidates) = dedup_snapshot(transactions, candidates);
        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());

        let mut lines = BTreeSet::new();
        for item in &outcome.matched {
            prop_assert!(lines.insert(item.line_id), "line matched twice");
        }

        let mut txns = BTreeSet::new();
        for item in &outcome.matched {
            prop_assert!(txns.insert(item.transaction_id));
        }
        for item in &outcome.ambiguous {
            prop_assert!(txns.insert(item.transaction_id));
        }
        for id in &outcome.unmatched {
            prop_assert!(txns.insert(*id));
        }

        // Every unmatched input transaction lands in exactly one bucket.
        let input_count = transactions
            .iter()
            .filter(|t| t.status == BankTxnStatus::Unmatched)
            .count();
        prop_assert_eq!(txns.len(), input_count);
    }

    /// Re-running on the post-run snapshot (matched transactions flipped to
    /// matched, consumed lines removed) finds nothing new to change:
    /// previously confirmed matches stay untouched.
    #[test]
    fn prop_rerun_is_idempotent(
        (transactions, candidates) in snapshot_strategy(),
    ) {
        let (transactions, candidates) = dedup_snapshot(transactions, candidates);
        let first =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());

        let matched_txns: BTreeSet<Uuid> =
            first.matched.iter().map(|m| m.transaction_id).collect();
        let consumed_lines: BTreeSet<Uuid> = first.matched.iter().map(|m| m.line_id).collect();

        let rerun_txns: Vec<BankTransactionRecord> = transactions
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if matched_txns.contains(&t.id) {
                    t.status = BankTxnStatus::Matched;
                }
                t
            })
            .collect();
        let rerun_candidates: Vec<LedgerCandidate> = candidates
            .iter()
            .filter(|c| !consumed_lines.contains(&c.line_id))
            .cloned()
            .collect();

        let second =
            ReconciliationMatcher::match_statement(&rerun_txns, &rerun_candidates, &settings());

        // Nothing previously matched is touched again.
        for item in &second.matched {
            prop_assert!(!matched_txns.contains(&item.transaction_id));
            prop_assert!(!consumed_lines.contains(&item.line_id));
        }

        // The leftover set resolves exactly as it did the first time.
        let mut first_unmatched = first.unmatched.clone();
        first_unmatched.sort();
        let mut second_unmatched = second.unmatched.clone();
        second_unmatched.sort();
        prop_assert_eq!(first_unmatched, second_unmatched);
    }
}
