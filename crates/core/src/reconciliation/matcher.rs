//! Bank statement matching algorithm.
//!
//! Given the same snapshot of transactions, candidates, and settings, the
//! matcher always produces the same outcome: transactions are processed in
//! (date, id) order, candidates are ranked by score with line-id
//! tie-breaks, and nothing depends on arrival order.

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use uuid::Uuid;

use super::types::{
    AmbiguousItem, BankTransactionRecord, BankTxnStatus, LedgerCandidate, MatchKind, MatchOutcome,
    MatchedItem, MatcherSettings,
};
use crate::dimension::TagSet;

/// Stateless bank statement matcher.
pub struct ReconciliationMatcher;

impl ReconciliationMatcher {
    /// Matches unmatched bank transactions against candidate ledger lines.
    ///
    /// Per transaction, in priority order:
    /// 1. Exact: same signed amount, posting date within the exact window,
    ///    token overlap at or above the threshold. Auto-accepted. Two or
    ///    more candidates tied on (overlap, date distance) become an
    ///    ambiguity exception instead of an arbitrary pick.
    /// 2. Fuzzy: same amount within the wide window, no reference
    ///    requirement. Lower confidence, flagged for manual confirmation;
    ///    ties broken by lowest line ID.
    /// 3. Otherwise the transaction stays unmatched and is reported as an
    ///    exception.
    ///
    /// Each ledger line is consumed by at most one match. Exact matching
    /// runs for the whole statement before fuzzy matching so a fuzzy pick
    /// can never steal a line an exact match needs.
    #[must_use]
    pub fn match_statement(
        transactions: &[BankTransactionRecord],
        candidates: &[LedgerCandidate],
        settings: &MatcherSettings,
    ) -> MatchOutcome {
        let mut ordered: Vec<&BankTransactionRecord> = transactions
            .iter()
            .filter(|t| t.status == BankTxnStatus::Unmatched)
            .collect();
        ordered.sort_by_key(|t| (t.date, t.id));

        let mut outcome = MatchOutcome::default();
        let mut used_lines: BTreeSet<Uuid> = BTreeSet::new();
        let mut pending: Vec<&BankTransactionRecord> = Vec::new();

        // Pass 1: exact matches (and ambiguity detection).
        for txn in ordered {
            match Self::best_exact(txn, candidates, settings, &used_lines) {
                ExactOutcome::Match(candidate, confidence) => {
                    used_lines.insert(candidate.line_id);
                    outcome.matched.push(MatchedItem {
                        transaction_id: txn.id,
                        line_id: candidate.line_id,
                        kind: MatchKind::Exact,
                        confidence,
                        auto_accepted: true,
                        dimension_mismatch: Self::dimension_mismatch(
                            &settings.expected_tags,
                            &candidate.tags,
                        ),
                    });
                }
                ExactOutcome::Ambiguous(line_ids) => {
                    outcome.ambiguous.push(AmbiguousItem {
                        transaction_id: txn.id,
                        candidate_line_ids: line_ids,
                    });
                }
                ExactOutcome::None => pending.push(txn),
            }
        }

        // Pass 2: fuzzy matches for what exact matching left over.
        for txn in pending {
            if let Some((candidate, confidence)) =
                Self::best_fuzzy(txn, candidates, settings, &used_lines)
            {
                used_lines.insert(candidate.line_id);
                outcome.matched.push(MatchedItem {
                    transaction_id: txn.id,
                    line_id: candidate.line_id,
                    kind: MatchKind::Fuzzy,
                    confidence,
                    auto_accepted: false,
                    dimension_mismatch: Self::dimension_mismatch(
                        &settings.expected_tags,
                        &candidate.tags,
                    ),
                });
            } else {
                outcome.unmatched.push(txn.id);
            }
        }

        outcome
    }

    /// Finds the best exact candidate, or the tied set if indistinguishable.
    fn best_exact<'a>(
        txn: &BankTransactionRecord,
        candidates: &'a [LedgerCandidate],
        settings: &MatcherSettings,
        used_lines: &BTreeSet<Uuid>,
    ) -> ExactOutcome<'a> {
        let mut scored: Vec<(Decimal, i64, &LedgerCandidate)> = candidates
            .iter()
            .filter(|c| !used_lines.contains(&c.line_id) && c.amount == txn.amount)
            .filter_map(|c| {
                let distance = date_distance(txn.date, c.posting_date);
                if distance > settings.exact_date_window_days {
                    return None;
                }
                let overlap = token_overlap(
                    &statement_tokens(&txn.description, txn.reference.as_deref()),
                    &statement_tokens(&c.description, c.reference.as_deref()),
                );
                (overlap >= settings.token_overlap_threshold).then_some((overlap, distance, c))
            })
            .collect();

        // Rank: overlap descending, then closest date, then lowest line ID.
        scored.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.line_id.cmp(&b.2.line_id))
        });

        let Some(&(best_overlap, best_distance, best)) = scored.first() else {
            return ExactOutcome::None;
        };

        let tied: Vec<Uuid> = scored
            .iter()
            .filter(|(overlap, distance, _)| {
                *overlap == best_overlap && *distance == best_distance
            })
            .map(|(_, _, c)| c.line_id)
            .collect();
        if tied.len() > 1 {
            return ExactOutcome::Ambiguous(tied);
        }

        let proximity = window_proximity(best_distance, settings.exact_date_window_days);
        // confidence in [0.7, 1.0]: base + overlap weight + date weight
        let confidence = Decimal::new(7, 1)
            + Decimal::new(2, 1) * best_overlap
            + Decimal::new(1, 1) * proximity;
        ExactOutcome::Match(best, confidence)
    }

    /// Finds the best fuzzy candidate: same amount in the wide window.
    fn best_fuzzy<'a>(
        txn: &BankTransactionRecord,
        candidates: &'a [LedgerCandidate],
        settings: &MatcherSettings,
        used_lines: &BTreeSet<Uuid>,
    ) -> Option<(&'a LedgerCandidate, Decimal)> {
        let mut eligible: Vec<(i64, &LedgerCandidate)> = candidates
            .iter()
            .filter(|c| !used_lines.contains(&c.line_id) && c.amount == txn.amount)
            .filter_map(|c| {
                let distance = date_distance(txn.date, c.posting_date);
                (distance <= settings.fuzzy_date_window_days).then_some((distance, c))
            })
            .collect();

        // Closest date wins; ties go to the lowest line ID.
        eligible.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.line_id.cmp(&b.1.line_id)));

        let &(distance, candidate) = eligible.first()?;
        let proximity = window_proximity(distance, settings.fuzzy_date_window_days);
        // confidence in [0.3, 0.5]: never high enough to auto-accept
        let confidence = Decimal::new(3, 1) + Decimal::new(2, 1) * proximity;
        Some((candidate, confidence))
    }

    /// True if any expected tag is absent or different on the line.
    fn dimension_mismatch(expected: &TagSet, actual: &TagSet) -> bool {
        expected
            .iter()
            .any(|(type_id, value_id)| actual.get(type_id) != Some(value_id))
    }
}

enum ExactOutcome<'a> {
    Match(&'a LedgerCandidate, Decimal),
    Ambiguous(Vec<Uuid>),
    None,
}

/// Absolute distance between two dates in days.
fn date_distance(a: chrono::NaiveDate, b: chrono::NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

/// Proximity score in [0, 1]: 1 for same-day, 0 at the window edge.
fn window_proximity(distance: i64, window_days: i64) -> Decimal {
    let window = window_days.max(1);
    Decimal::from(window - distance.min(window)) / Decimal::from(window)
}

/// Tokenizes a statement description plus reference for overlap scoring.
fn statement_tokens(description: &str, reference: Option<&str>) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    for source in [Some(description), reference].into_iter().flatten() {
        for token in source
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            tokens.insert(token.to_string());
        }
    }
    tokens
}

/// Overlap coefficient between two token sets: |a & b| / min(|a|, |b|).
///
/// Zero when either side has no tokens at all.
fn token_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Decimal {
    if a.is_empty() || b.is_empty() {
        return Decimal::ZERO;
    }
    let intersection = a.intersection(b).count();
    let smaller = a.len().min(b.len());
    Decimal::from(intersection) / Decimal::from(smaller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings() -> MatcherSettings {
        MatcherSettings {
            exact_date_window_days: 3,
            fuzzy_date_window_days: 14,
            token_overlap_threshold: dec!(0.5),
            expected_tags: TagSet::new(),
        }
    }

    fn txn(id: u128, date: NaiveDate, amount: Decimal, description: &str) -> BankTransactionRecord {
        BankTransactionRecord {
            id: Uuid::from_u128(id),
            bank_account_id: Uuid::from_u128(99),
            date,
            amount,
            description: description.to_string(),
            reference: None,
            status: BankTxnStatus::Unmatched,
        }
    }

    fn candidate(id: u128, date: NaiveDate, amount: Decimal, description: &str) -> LedgerCandidate {
        LedgerCandidate {
            line_id: Uuid::from_u128(id),
            entry_id: Uuid::new_v4(),
            posting_date: date,
            amount,
            description: description.to_string(),
            reference: None,
            tags: TagSet::new(),
        }
    }

    #[test]
    fn test_exact_match_within_window() {
        // Statement line one day after the posting, same wording.
        let transactions = vec![txn(
            1,
            ymd(2025, 10, 15),
            dec!(-450.00),
            "ACME supplies invoice 1042",
        )];
        let candidates = vec![candidate(
            10,
            ymd(2025, 10, 14),
            dec!(-450.00),
            "ACME supplies invoice 1042",
        )];

        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());
        assert_eq!(outcome.matched.len(), 1);
        let item = &outcome.matched[0];
        assert_eq!(item.kind, MatchKind::Exact);
        assert!(item.auto_accepted);
        assert!(item.confidence > dec!(0.9));
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_no_counterpart_stays_unmatched() {
        let transactions = vec![
            txn(1, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies"),
            txn(2, ymd(2025, 10, 16), dec!(-999.00), "Unknown payee"),
        ];
        let candidates = vec![candidate(10, ymd(2025, 10, 14), dec!(-450.00), "ACME supplies")];

        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());
        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.unmatched, vec![Uuid::from_u128(2)]);
    }

    #[test]
    fn test_outside_exact_window_falls_to_fuzzy() {
        // Five days apart: beyond the exact window, inside the fuzzy one.
        let transactions = vec![txn(1, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies")];
        let candidates = vec![candidate(10, ymd(2025, 10, 10), dec!(-450.00), "ACME supplies")];

        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());
        assert_eq!(outcome.matched.len(), 1);
        let item = &outcome.matched[0];
        assert_eq!(item.kind, MatchKind::Fuzzy);
        assert!(!item.auto_accepted);
        assert!(item.confidence < dec!(0.5));
    }

    #[test]
    fn test_low_overlap_falls_to_fuzzy() {
        // Same amount and date but entirely different wording.
        let transactions = vec![txn(1, ymd(2025, 10, 15), dec!(-450.00), "POS card payment")];
        let candidates = vec![candidate(10, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies")];

        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());
        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].kind, MatchKind::Fuzzy);
    }

    #[test]
    fn test_tied_exact_candidates_are_ambiguous() {
        // Two identical postings on the same day: nothing distinguishes
        // them, so no auto-pick.
        let transactions = vec![txn(1, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies")];
        let candidates = vec![
            candidate(10, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies"),
            candidate(11, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies"),
        ];

        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());
        assert!(outcome.matched.is_empty());
        assert_eq!(outcome.ambiguous.len(), 1);
        assert_eq!(
            outcome.ambiguous[0].candidate_line_ids,
            vec![Uuid::from_u128(10), Uuid::from_u128(11)]
        );
    }

    #[test]
    fn test_closer_date_wins_exact_tie_on_overlap() {
        let transactions = vec![txn(1, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies")];
        let candidates = vec![
            candidate(10, ymd(2025, 10, 13), dec!(-450.00), "ACME supplies"),
            candidate(11, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies"),
        ];

        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());
        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].line_id, Uuid::from_u128(11));
    }

    #[test]
    fn test_fuzzy_tie_breaks_by_lowest_line_id() {
        let transactions = vec![txn(1, ymd(2025, 10, 15), dec!(-450.00), "wire transfer")];
        let candidates = vec![
            candidate(11, ymd(2025, 10, 10), dec!(-450.00), "ACME supplies"),
            candidate(10, ymd(2025, 10, 10), dec!(-450.00), "Globex rental"),
        ];

        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());
        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].line_id, Uuid::from_u128(10));
    }

    #[test]
    fn test_line_consumed_at_most_once() {
        let transactions = vec![
            txn(1, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies"),
            txn(2, ymd(2025, 10, 16), dec!(-450.00), "ACME supplies"),
        ];
        let candidates = vec![candidate(10, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies")];

        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &candidates, &settings());
        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].transaction_id, Uuid::from_u128(1));
        assert_eq!(outcome.unmatched, vec![Uuid::from_u128(2)]);
    }

    #[test]
    fn test_dimension_mismatch_recorded_not_blocking() {
        let cost_center = Uuid::from_u128(500);
        let expected_value = Uuid::from_u128(501);
        let other_value = Uuid::from_u128(502);

        let mut settings = settings();
        settings.expected_tags.insert(cost_center, expected_value);

        let transactions = vec![txn(1, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies")];
        let mut tagged = candidate(10, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies");
        tagged.tags.insert(cost_center, other_value);

        let outcome =
            ReconciliationMatcher::match_statement(&transactions, &[tagged], &settings);
        assert_eq!(outcome.matched.len(), 1);
        assert!(outcome.matched[0].dimension_mismatch);
        assert!(outcome.matched[0].auto_accepted);
    }

    #[test]
    fn test_already_matched_transactions_skipped() {
        let mut matched_txn = txn(1, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies");
        matched_txn.status = BankTxnStatus::Matched;
        let candidates = vec![candidate(10, ymd(2025, 10, 15), dec!(-450.00), "ACME supplies")];

        let outcome =
            ReconciliationMatcher::match_statement(&[matched_txn], &candidates, &settings());
        assert!(outcome.matched.is_empty());
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_token_overlap() {
        let a = statement_tokens("ACME supplies invoice 1042", None);
        let b = statement_tokens("acme SUPPLIES inv", Some("1042"));
        // Three of b's four tokens appear in a.
        assert_eq!(token_overlap(&a, &b), dec!(0.75));
        assert_eq!(token_overlap(&a, &statement_tokens("", None)), dec!(0));
    }

    #[test]
    fn test_window_proximity() {
        assert_eq!(window_proximity(0, 3), dec!(1));
        assert_eq!(window_proximity(3, 3), dec!(0));
        assert_eq!(window_proximity(9, 3), dec!(0));
    }
}
