//! Structural and balance validation for journal entries.

use rust_decimal::Decimal;

use super::error::PostingError;
use super::types::{EntryTotals, JournalLineInput};
use ledgra_shared::types::Currency;
use ledgra_shared::types::money::fits_money_scale;

/// Validates the structure of a single line.
///
/// Exactly one of debit/credit must be non-zero, both must be non-negative,
/// amounts must fit the monetary scale, and the line currency must match the
/// entry currency.
///
/// # Errors
///
/// Returns a `PostingError` carrying `line_index` on the first violation.
pub fn validate_line(
    line: &JournalLineInput,
    line_index: usize,
    entry_currency: Currency,
) -> Result<(), PostingError> {
    if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
        return Err(PostingError::NegativeAmount { line_index });
    }
    if line.debit != Decimal::ZERO && line.credit != Decimal::ZERO {
        return Err(PostingError::BothSidesSet { line_index });
    }
    if line.debit == Decimal::ZERO && line.credit == Decimal::ZERO {
        return Err(PostingError::ZeroAmount { line_index });
    }
    if !fits_money_scale(line.debit) || !fits_money_scale(line.credit) {
        return Err(PostingError::ScaleExceeded { line_index });
    }
    if line.currency != entry_currency {
        return Err(PostingError::CurrencyMismatch { line_index });
    }
    Ok(())
}

/// Computes entry totals by summing debit and credit columns independently.
#[must_use]
pub fn compute_totals(lines: &[JournalLineInput]) -> EntryTotals {
    let debit_total: Decimal = lines.iter().map(|l| l.debit).sum();
    let credit_total: Decimal = lines.iter().map(|l| l.credit).sum();
    EntryTotals::new(debit_total, credit_total)
}

/// Validates that entry totals balance exactly. No rounding tolerance.
///
/// # Errors
///
/// Returns `UnbalancedEntry` if debits != credits.
pub fn validate_balance(totals: &EntryTotals) -> Result<(), PostingError> {
    if totals.is_balanced {
        Ok(())
    } else {
        Err(PostingError::UnbalancedEntry {
            debit: totals.debit_total,
            credit: totals.credit_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::TagSet;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn line(debit: Decimal, credit: Decimal) -> JournalLineInput {
        JournalLineInput {
            account_id: Uuid::new_v4(),
            debit,
            credit,
            currency: Currency::Usd,
            memo: None,
            tags: TagSet::new(),
        }
    }

    #[test]
    fn test_valid_debit_line() {
        assert!(validate_line(&line(dec!(100.00), dec!(0)), 0, Currency::Usd).is_ok());
    }

    #[test]
    fn test_valid_credit_line() {
        assert!(validate_line(&line(dec!(0), dec!(100.00)), 0, Currency::Usd).is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert!(matches!(
            validate_line(&line(dec!(0), dec!(0)), 3, Currency::Usd),
            Err(PostingError::ZeroAmount { line_index: 3 })
        ));
    }

    #[test]
    fn test_both_sides_rejected() {
        assert!(matches!(
            validate_line(&line(dec!(50), dec!(50)), 1, Currency::Usd),
            Err(PostingError::BothSidesSet { line_index: 1 })
        ));
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(matches!(
            validate_line(&line(dec!(-10), dec!(0)), 0, Currency::Usd),
            Err(PostingError::NegativeAmount { line_index: 0 })
        ));
    }

    #[test]
    fn test_scale_exceeded_rejected() {
        assert!(matches!(
            validate_line(&line(dec!(10.005), dec!(0)), 0, Currency::Usd),
            Err(PostingError::ScaleExceeded { line_index: 0 })
        ));
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        assert!(matches!(
            validate_line(&line(dec!(10), dec!(0)), 0, Currency::Eur),
            Err(PostingError::CurrencyMismatch { line_index: 0 })
        ));
    }

    #[test]
    fn test_totals_balanced() {
        let lines = vec![line(dec!(100.00), dec!(0)), line(dec!(0), dec!(100.00))];
        let totals = compute_totals(&lines);
        assert!(validate_balance(&totals).is_ok());
    }

    #[test]
    fn test_totals_unbalanced() {
        let lines = vec![line(dec!(100.00), dec!(0)), line(dec!(0), dec!(60.00))];
        let totals = compute_totals(&lines);
        assert!(matches!(
            validate_balance(&totals),
            Err(PostingError::UnbalancedEntry { .. })
        ));
    }
}
