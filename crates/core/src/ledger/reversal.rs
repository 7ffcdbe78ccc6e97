//! Reversal entry construction.
//!
//! A reversal is a new entry whose lines mirror the original with debit and
//! credit swapped. The original entry is never mutated beyond its status;
//! its lines stay in the ledger for audit.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::JournalLineInput;
use crate::dimension::TagSet;
use ledgra_shared::types::Currency;

/// A posted line as loaded from the ledger, ready to be mirrored.
#[derive(Debug, Clone)]
pub struct PostedLineView {
    /// The account the original line posted to.
    pub account_id: Uuid,
    /// Original debit amount.
    pub debit: Decimal,
    /// Original credit amount.
    pub credit: Decimal,
    /// Line currency.
    pub currency: Currency,
    /// Original memo.
    pub memo: Option<String>,
    /// Original dimension tags.
    pub tags: TagSet,
}

/// Output from building a reversal.
#[derive(Debug)]
pub struct ReversalBuild {
    /// The mirrored lines for the reversing entry.
    pub lines: Vec<JournalLineInput>,
    /// Description for the reversing entry.
    pub description: String,
}

/// Stateless service for building reversal entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the mirrored lines for a reversal.
    ///
    /// For each original line:
    /// - debit and credit are swapped,
    /// - account, amount, currency, and dimension tags are preserved,
    /// - the memo is prefixed with "Reversal: ".
    #[must_use]
    pub fn build(entry_number: i64, lines: &[PostedLineView]) -> ReversalBuild {
        let reversing_lines = lines
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                debit: line.credit,
                credit: line.debit,
                currency: line.currency,
                memo: Some(format!(
                    "Reversal: {}",
                    line.memo.clone().unwrap_or_default()
                )),
                tags: line.tags.clone(),
            })
            .collect();

        ReversalBuild {
            lines: reversing_lines,
            description: format!("Reversal of entry #{entry_number}"),
        }
    }

    /// Validates that the original lines are balanced.
    ///
    /// This should always hold for posted entries; it is re-checked as a
    /// guard before the mirror is committed.
    #[must_use]
    pub fn original_is_balanced(lines: &[PostedLineView]) -> bool {
        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();
        total_debit == total_credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn posted_line(debit: Decimal, credit: Decimal, memo: Option<&str>) -> PostedLineView {
        PostedLineView {
            account_id: Uuid::new_v4(),
            debit,
            credit,
            currency: Currency::Usd,
            memo: memo.map(String::from),
            tags: TagSet::new(),
        }
    }

    #[test]
    fn test_build_swaps_sides() {
        let lines = vec![
            posted_line(dec!(100.00), dec!(0), Some("Cash")),
            posted_line(dec!(0), dec!(100.00), Some("Revenue")),
        ];

        let build = ReversalService::build(42, &lines);

        assert_eq!(build.lines.len(), 2);
        assert_eq!(build.lines[0].debit, dec!(0));
        assert_eq!(build.lines[0].credit, dec!(100.00));
        assert_eq!(build.lines[1].debit, dec!(100.00));
        assert_eq!(build.lines[1].credit, dec!(0));
    }

    #[test]
    fn test_build_preserves_account_and_tags() {
        let cost_center = Uuid::new_v4();
        let cc_value = Uuid::new_v4();
        let mut line = posted_line(dec!(75.50), dec!(0), None);
        line.tags.insert(cost_center, cc_value);
        let account_id = line.account_id;

        let build = ReversalService::build(7, &[line]);

        assert_eq!(build.lines[0].account_id, account_id);
        assert_eq!(build.lines[0].tags.get(&cost_center), Some(&cc_value));
    }

    #[test]
    fn test_build_memo_prefix_and_description() {
        let lines = vec![posted_line(dec!(10.00), dec!(0), Some("Office supplies"))];
        let build = ReversalService::build(19, &lines);

        assert_eq!(
            build.lines[0].memo.as_deref(),
            Some("Reversal: Office supplies")
        );
        assert_eq!(build.description, "Reversal of entry #19");
    }

    #[test]
    fn test_original_is_balanced() {
        let balanced = vec![
            posted_line(dec!(100.00), dec!(0), None),
            posted_line(dec!(0), dec!(100.00), None),
        ];
        assert!(ReversalService::original_is_balanced(&balanced));

        let unbalanced = vec![
            posted_line(dec!(100.00), dec!(0), None),
            posted_line(dec!(0), dec!(50.00), None),
        ];
        assert!(!ReversalService::original_is_balanced(&unbalanced));
    }

    #[test]
    fn test_double_reversal_restores_original_sides() {
        let original = vec![
            posted_line(dec!(60.00), dec!(0), None),
            posted_line(dec!(0), dec!(60.00), None),
        ];

        let first = ReversalService::build(1, &original);
        let as_posted: Vec<PostedLineView> = first
            .lines
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
        let second = ReversalService::build(2, &as_posted);

        assert_eq!(second.lines[0].debit, original[0].debit);
        assert_eq!(second.lines[0].credit, original[0].credit);
        assert_eq!(second.lines[1].debit, original[1].debit);
        assert_eq!(second.lines[1].credit, original[1].credit);
    }
}
