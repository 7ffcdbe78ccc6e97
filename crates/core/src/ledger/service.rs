//! Posting service for journal entry validation.
//!
//! This service contains pure business logic with no database dependencies.
//! It validates entries in a fixed order before the repository commits them:
//! structure per line, then balance, then dimension legality. Idempotency is
//! checked last, at the commit boundary, by the repository.

use uuid::Uuid;

use super::error::PostingError;
use super::types::{EntryStatus, EntryTotals, JournalEntryInput};
use super::validation::{compute_totals, validate_balance, validate_line};
use crate::dimension::{self, DimensionError, DimensionValueInfo};

/// The slice of an account the posting service needs.
#[derive(Debug, Clone)]
pub struct AccountView {
    /// The account ID.
    pub id: Uuid,
    /// Whether the account accepts new postings.
    pub is_active: bool,
    /// Dimension types every line on this account must carry.
    pub required_dimensions: Vec<Uuid>,
}

/// Posting service for journal entry validation.
pub struct PostingService;

impl PostingService {
    /// Validates a journal entry end to end.
    ///
    /// Validation order is a contract:
    /// 1. structural (each line well-formed, currency matches header)
    /// 2. balance (sum of debits == sum of credits, exact)
    /// 3. dimension legality (per line, against the account's requirements)
    ///
    /// The caller-supplied idempotency key is checked by the repository at
    /// the commit boundary, after this function succeeds.
    ///
    /// # Arguments
    ///
    /// * `input` - The entry to validate
    /// * `account_lookup` - Resolves an account ID to its posting view
    /// * `dimension_lookup` - Resolves a dimension value ID to its type and
    ///   activity
    ///
    /// # Errors
    ///
    /// Returns `PostingError` with the offending line index on the first
    /// violation.
    pub fn validate_entry<A, D>(
        input: &JournalEntryInput,
        account_lookup: A,
        dimension_lookup: D,
    ) -> Result<EntryTotals, PostingError>
    where
        A: Fn(Uuid) -> Option<AccountView>,
        D: Fn(Uuid) -> Option<DimensionValueInfo>,
    {
        // 1. Structural validation
        if input.lines.is_empty() {
            return Err(PostingError::EmptyEntry);
        }
        for (line_index, line) in input.lines.iter().enumerate() {
            validate_line(line, line_index, input.currency)?;
        }

        // 2. Balance validation
        let totals = compute_totals(&input.lines);
        validate_balance(&totals)?;

        // 3. Dimension legality, per line
        for (line_index, line) in input.lines.iter().enumerate() {
            let account = account_lookup(line.account_id).ok_or(PostingError::AccountNotFound {
                line_index,
                account_id: line.account_id,
            })?;
            if !account.is_active {
                return Err(PostingError::AccountInactive {
                    line_index,
                    account_id: line.account_id,
                });
            }

            dimension::validate_tags(&account.required_dimensions, &line.tags, &dimension_lookup)
                .map_err(|e| Self::dimension_error(line_index, e))?;
        }

        Ok(totals)
    }

    /// Validates that an entry can be reversed.
    ///
    /// Only posted entries that have not already been reversed qualify.
    ///
    /// # Errors
    ///
    /// Returns `NotPosted` or `AlreadyReversed`.
    pub fn validate_can_reverse(
        entry_id: Uuid,
        status: EntryStatus,
        reversed_by: Option<Uuid>,
    ) -> Result<(), PostingError> {
        if reversed_by.is_some() || status == EntryStatus::Reversed {
            return Err(PostingError::AlreadyReversed(entry_id));
        }
        if status != EntryStatus::Posted {
            return Err(PostingError::NotPosted(entry_id));
        }
        Ok(())
    }

    fn dimension_error(line_index: usize, error: DimensionError) -> PostingError {
        match error {
            DimensionError::UnknownValue(value_id) => PostingError::UnknownDimensionValue {
                line_index,
                value_id,
            },
            DimensionError::InactiveValue(value_id) => PostingError::InactiveDimensionValue {
                line_index,
                value_id,
            },
            DimensionError::TypeMismatch { value_id, .. } => PostingError::DimensionTypeMismatch {
                line_index,
                value_id,
            },
            DimensionError::MissingRequiredType(dimension_type_id) => {
                PostingError::MissingRequiredDimension {
                    line_index,
                    dimension_type_id,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::TagSet;
    use crate::ledger::types::{EntrySource, JournalLineInput};
    use chrono::NaiveDate;
    use ledgra_shared::types::Currency;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn make_line(debit: Decimal, credit: Decimal) -> JournalLineInput {
        JournalLineInput {
            account_id: Uuid::new_v4(),
            debit,
            credit,
            currency: Currency::Usd,
            memo: None,
            tags: TagSet::new(),
        }
    }

    fn make_input(lines: Vec<JournalLineInput>) -> JournalEntryInput {
        JournalEntryInput {
            posting_date: NaiveDate::from_ymd_opt(2026, 7, 15).unwrap(),
            description: "Test entry".to_string(),
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

    #[test]
    fn test_validate_balanced_entry() {
        let input = make_input(vec![
            make_line(dec!(1000.00), dec!(0)),
            make_line(dec!(0), dec!(1000.00)),
        ]);

        let totals = PostingService::validate_entry(&input, ok_account, no_dimensions).unwrap();
        assert!(totals.is_balanced);
        assert_eq!(totals.debit_total, dec!(1000.00));
        assert_eq!(totals.credit_total, dec!(1000.00));
    }

    #[test]
    fn test_validate_empty_entry() {
        let input = make_input(vec![]);
        assert!(matches!(
            PostingService::validate_entry(&input, ok_account, no_dimensions),
            Err(PostingError::EmptyEntry)
        ));
    }

    #[test]
    fn test_single_line_entry_is_unbalanced() {
        // A lone debit with no offsetting credit fails the balance check,
        // not a minimum-line-count check.
        let input = make_input(vec![make_line(dec!(500.00), dec!(0))]);
        assert!(matches!(
            PostingService::validate_entry(&input, ok_account, no_dimensions),
            Err(PostingError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn test_structural_checked_before_balance() {
        // Line 1 is negative AND the entry is unbalanced; the structural
        // error wins because it is checked first.
        let input = make_input(vec![
            make_line(dec!(100.00), dec!(0)),
            make_line(dec!(-40.00), dec!(0)),
        ]);
        assert!(matches!(
            PostingService::validate_entry(&input, ok_account, no_dimensions),
            Err(PostingError::NegativeAmount { line_index: 1 })
        ));
    }

    #[test]
    fn test_unknown_account() {
        let input = make_input(vec![
            make_line(dec!(100.00), dec!(0)),
            make_line(dec!(0), dec!(100.00)),
        ]);

        let result = PostingService::validate_entry(&input, |_| None, no_dimensions);
        assert!(matches!(
            result,
            Err(PostingError::AccountNotFound { line_index: 0, .. })
        ));
    }

    #[test]
    fn test_inactive_account() {
        let input = make_input(vec![
            make_line(dec!(100.00), dec!(0)),
            make_line(dec!(0), dec!(100.00)),
        ]);

        let inactive = |id: Uuid| {
            Some(AccountView {
                id,
                is_active: false,
                required_dimensions: vec![],
            })
        };
        assert!(matches!(
            PostingService::validate_entry(&input, inactive, no_dimensions),
            Err(PostingError::AccountInactive { line_index: 0, .. })
        ));
    }

    #[test]
    fn test_missing_required_dimension() {
        let cost_center = Uuid::new_v4();
        let input = make_input(vec![
            make_line(dec!(100.00), dec!(0)),
            make_line(dec!(0), dec!(100.00)),
        ]);

        let requires_cc = |id: Uuid| {
            Some(AccountView {
                id,
                is_active: true,
                required_dimensions: vec![cost_center],
            })
        };
        let result = PostingService::validate_entry(&input, requires_cc, no_dimensions);
        assert!(matches!(
            result,
            Err(PostingError::MissingRequiredDimension {
                line_index: 0,
                dimension_type_id,
            }) if dimension_type_id == cost_center
        ));
    }

    #[test]
    fn test_tagged_entry_passes_required_dimension() {
        let cost_center = Uuid::new_v4();
        let cc_value = Uuid::new_v4();

        let mut debit = make_line(dec!(100.00), dec!(0));
        debit.tags.insert(cost_center, cc_value);
        let mut credit = make_line(dec!(0), dec!(100.00));
        credit.tags.insert(cost_center, cc_value);
        let input = make_input(vec![debit, credit]);

        let requires_cc = |id: Uuid| {
            Some(AccountView {
                id,
                is_active: true,
                required_dimensions: vec![cost_center],
            })
        };
        let dims = move |id: Uuid| {
            (id == cc_value).then_some(DimensionValueInfo {
                dimension_type_id: cost_center,
                is_active: true,
            })
        };

        assert!(PostingService::validate_entry(&input, requires_cc, dims).is_ok());
    }

    #[test]
    fn test_validate_can_reverse_posted() {
        let id = Uuid::new_v4();
        assert!(PostingService::validate_can_reverse(id, EntryStatus::Posted, None).is_ok());
    }

    #[test]
    fn test_validate_can_reverse_draft() {
        let id = Uuid::new_v4();
        assert!(matches!(
            PostingService::validate_can_reverse(id, EntryStatus::Draft, None),
            Err(PostingError::NotPosted(_))
        ));
    }

    #[test]
    fn test_validate_can_reverse_already_reversed() {
        let id = Uuid::new_v4();
        assert!(matches!(
            PostingService::validate_can_reverse(id, EntryStatus::Reversed, None),
            Err(PostingError::AlreadyReversed(_))
        ));
        assert!(matches!(
            PostingService::validate_can_reverse(id, EntryStatus::Posted, Some(Uuid::new_v4())),
            Err(PostingError::AlreadyReversed(_))
        ));
    }
}
