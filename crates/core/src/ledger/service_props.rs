//! Property tests for posting validation and reversal.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::reversal::{PostedLineView, ReversalService};
use super::service::{AccountView, PostingService};
use super::types::{EntrySource, JournalEntryInput, JournalLineInput};
use crate::dimension::{DimensionValueInfo, TagSet};
use ledgra_shared::types::Currency;

/// Strategy for positive amounts in cents, up to 1,000,000.00.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a balanced entry: each generated amount produces one debit
/// line and one credit line of the same size.
fn balanced_lines_strategy(max_pairs: usize) -> impl Strategy<Value = Vec<JournalLineInput>> {
    prop::collection::vec(amount_strategy(), 1..=max_pairs).prop_map(|amounts| {
        let mut lines = Vec::with_capacity(amounts.len() * 2);
        for amount in amounts {
            lines.push(JournalLineInput {
                account_id: Uuid::new_v4(),
                debit: amount,
                credit: Decimal::ZERO,
                currency: Currency::Usd,
                memo: None,
                tags: TagSet::new(),
            });
            lines.push(JournalLineInput {
                account_id: Uuid::new_v4(),
                debit: Decimal::ZERO,
                credit: amount,
                currency: Currency::Usd,
                memo: None,
                tags: TagSet::new(),
            });
        }
        lines
    })
}

fn make_input(lines: Vec<JournalLineInput>) -> JournalEntryInput {
    JournalEntryInput {
        posting_date: NaiveDate::from_ymd_opt(2026, 7, 15).unwrap(),
        description: "prop entry".to_string(),
        source: EntrySource::Manual,
        currency: Currency::Usd,
        reference: None,
        idempotency_key: None,
        lines,
        created_by: Uuid::new_v4(),
    }
}

fn ok_account(id: Uuid) -> Option<AccountView> {
    Some(AccountView {
        id,
        is_active: true,
        required_dimensions: vec![],
    })
}

fn no_dimensions(_id: Uuid) -> Option<DimensionValueInfo> {
    None
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every entry built from matched debit/credit pairs passes validation
    /// and reports equal column totals.
    #[test]
    fn prop_balanced_entries_accepted(lines in balanced_lines_strategy(10)) {
        let input = make_input(lines);
        let totals = PostingService::validate_entry(&input, ok_account, no_dimensions)
            .expect("balanced entry must validate");
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.debit_total, totals.credit_total);
    }

    /// Perturbing any single line by one cent breaks the balance and the
    /// entry is rejected, with no tolerance.
    #[test]
    fn prop_one_cent_skew_rejected(
        lines in balanced_lines_strategy(10),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut lines = lines;
        let idx = pick.index(lines.len());
        if lines[idx].debit > Decimal::ZERO {
            lines[idx].debit += Decimal::new(1, 2);
        } else {
            lines[idx].credit += Decimal::new(1, 2);
        }
        let input = make_input(lines);
        let result = PostingService::validate_entry(&input, ok_account, no_dimensions);
        let is_unbalanced = matches!(
            result,
            Err(super::error::PostingError::UnbalancedEntry { .. })
        );
        prop_assert!(is_unbalanced);
    }

    /// A reversal mirrors the original exactly: column totals swap, and per
    /// account the combined original + reversal nets to zero.
    #[test]
    fn prop_reversal_cancels_original(lines in balanced_lines_strategy(10)) {
        let posted: Vec<PostedLineView> = lines
            .iter()
            .map(|l| PostedLineView {
                account_id: l.account_id,
                debit: l.debit,
                credit: l.credit,
                currency: l.currency,
                memo: l.memo.clone(),
                tags: l.tags.clone(),
            })
            .collect();
        prop_assert!(ReversalService::original_is_balanced(&posted));

        let build = ReversalService::build(1, &posted);
        prop_assert_eq!(build.lines.len(), posted.len());

        for (original, mirrored) in posted.iter().zip(&build.lines) {
            prop_assert_eq!(mirrored.account_id, original.account_id);
            prop_assert_eq!(mirrored.debit, original.credit);
            prop_assert_eq!(mirrored.credit, original.debit);
        }

        // Per-account net effect of original + reversal is zero.
        let mut net: std::collections::HashMap<Uuid, Decimal> = std::collections::HashMap::new();
        for line in &posted {
            *net.entry(line.account_id).or_default() += line.debit - line.credit;
        }
        for line in &build.lines {
            *net.entry(line.account_id).or_default() += line.debit - line.credit;
        }
        for (_, balance) in net {
            prop_assert_eq!(balance, Decimal::ZERO);
        }
    }

    /// The reversal of a balanced entry is itself a valid entry.
    #[test]
    fn prop_reversal_is_postable(lines in balanced_lines_strategy(10)) {
        let posted: Vec<PostedLineView> = lines
            .iter()
            .map(|l| PostedLineView {
                account_id: l.account_id,
                debit: l.debit,
                credit: l.credit,
                currency: l.currency,
                memo: l.memo.clone(),
                tags: l.tags.clone(),
            })
            .collect();

        let build = ReversalService::build(1, &posted);
        let input = make_input(build.lines);
        prop_assert!(
            PostingService::validate_entry(&input, ok_account, no_dimensions).is_ok()
        );
    }
}
