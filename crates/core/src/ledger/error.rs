//! Posting error types.
//!
//! Validation variants carry the offending line index so callers can point
//! at the exact input line that failed.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during posting operations.
#[derive(Debug, Error)]
pub enum PostingError {
    // ========== Structural Errors ==========
    /// Entry must have at least one line.
    #[error("Entry must have at least one line")]
    EmptyEntry,

    /// Line has neither a debit nor a credit amount.
    #[error("Line {line_index}: amount cannot be zero")]
    ZeroAmount {
        /// Index of the offending line.
        line_index: usize,
    },

    /// Line has both a debit and a credit amount.
    #[error("Line {line_index}: exactly one of debit/credit must be set")]
    BothSidesSet {
        /// Index of the offending line.
        line_index: usize,
    },

    /// Line has a negative amount.
    #[error("Line {line_index}: amount cannot be negative")]
    NegativeAmount {
        /// Index of the offending line.
        line_index: usize,
    },

    /// Line amount has more fractional digits than the monetary scale.
    #[error("Line {line_index}: amount exceeds the monetary scale")]
    ScaleExceeded {
        /// Index of the offending line.
        line_index: usize,
    },

    /// Line currency differs from the entry header currency.
    #[error("Line {line_index}: currency does not match the entry currency")]
    CurrencyMismatch {
        /// Index of the offending line.
        line_index: usize,
    },

    // ========== Balance Errors ==========
    /// Entry is not balanced (debits != credits).
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== Account Errors ==========
    /// Line references an unknown account.
    #[error("Line {line_index}: account not found: {account_id}")]
    AccountNotFound {
        /// Index of the offending line.
        line_index: usize,
        /// The unknown account.
        account_id: Uuid,
    },

    /// Line references an inactive account.
    #[error("Line {line_index}: account {account_id} is inactive")]
    AccountInactive {
        /// Index of the offending line.
        line_index: usize,
        /// The inactive account.
        account_id: Uuid,
    },

    // ========== Dimension Errors ==========
    /// Account requires a dimension type the line does not carry.
    #[error("Line {line_index}: required dimension type missing: {dimension_type_id}")]
    MissingRequiredDimension {
        /// Index of the offending line.
        line_index: usize,
        /// The missing dimension type.
        dimension_type_id: Uuid,
    },

    /// Line tag references an unknown dimension value.
    #[error("Line {line_index}: unknown dimension value: {value_id}")]
    UnknownDimensionValue {
        /// Index of the offending line.
        line_index: usize,
        /// The unknown value.
        value_id: Uuid,
    },

    /// Line tag references an inactive dimension value.
    #[error("Line {line_index}: dimension value {value_id} is inactive")]
    InactiveDimensionValue {
        /// Index of the offending line.
        line_index: usize,
        /// The inactive value.
        value_id: Uuid,
    },

    /// Line tag's value belongs to a different dimension type.
    #[error("Line {line_index}: dimension value {value_id} tagged under the wrong type")]
    DimensionTypeMismatch {
        /// Index of the offending line.
        line_index: usize,
        /// The mismatched value.
        value_id: Uuid,
    },

    // ========== Commit Errors ==========
    /// Idempotency key already corresponds to a committed entry.
    #[error("Duplicate posting for idempotency key '{key}'")]
    DuplicatePosting {
        /// The reused idempotency key.
        key: String,
    },

    /// Entry not found.
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Only posted entries can be reversed.
    #[error("Entry {0} is not posted and cannot be reversed")]
    NotPosted(Uuid),

    /// Entry has already been reversed.
    #[error("Entry {0} has already been reversed")]
    AlreadyReversed(Uuid),

    /// Storage-layer serialization conflict; safe to retry with the same
    /// idempotency key.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Durability layer unreachable; the call has no partial effect.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::BothSidesSet { .. } => "BOTH_SIDES_SET",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::ScaleExceeded { .. } => "SCALE_EXCEEDED",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive { .. } => "ACCOUNT_INACTIVE",
            Self::MissingRequiredDimension { .. } => "MISSING_REQUIRED_DIMENSION",
            Self::UnknownDimensionValue { .. } => "UNKNOWN_DIMENSION_VALUE",
            Self::InactiveDimensionValue { .. } => "INACTIVE_DIMENSION_VALUE",
            Self::DimensionTypeMismatch { .. } => "DIMENSION_TYPE_MISMATCH",
            Self::DuplicatePosting { .. } => "DUPLICATE_POSTING",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::NotPosted(_) => "NOT_POSTED",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::EmptyEntry
            | Self::ZeroAmount { .. }
            | Self::BothSidesSet { .. }
            | Self::NegativeAmount { .. }
            | Self::ScaleExceeded { .. }
            | Self::CurrencyMismatch { .. }
            | Self::UnbalancedEntry { .. }
            | Self::AccountInactive { .. }
            | Self::MissingRequiredDimension { .. }
            | Self::UnknownDimensionValue { .. }
            | Self::InactiveDimensionValue { .. }
            | Self::DimensionTypeMismatch { .. } => 400,

            // 404 Not Found
            Self::AccountNotFound { .. } | Self::EntryNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicatePosting { .. }
            | Self::ConcurrentModification
            | Self::NotPosted(_)
            | Self::AlreadyReversed(_) => 409,

            // 503 Service Unavailable
            Self::StorageUnavailable(_) => 503,
        }
    }

    /// Returns true if the caller should retry with the same idempotency key.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PostingError::UnbalancedEntry {
                debit: dec!(100),
                credit: dec!(50),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            PostingError::MissingRequiredDimension {
                line_index: 0,
                dimension_type_id: Uuid::nil(),
            }
            .error_code(),
            "MISSING_REQUIRED_DIMENSION"
        );
        assert_eq!(
            PostingError::DuplicatePosting { key: "k".into() }.error_code(),
            "DUPLICATE_POSTING"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(PostingError::EmptyEntry.http_status_code(), 400);
        assert_eq!(
            PostingError::AccountNotFound {
                line_index: 0,
                account_id: Uuid::nil(),
            }
            .http_status_code(),
            404
        );
        assert_eq!(PostingError::ConcurrentModification.http_status_code(), 409);
        assert_eq!(
            PostingError::StorageUnavailable("down".into()).http_status_code(),
            503
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(PostingError::ConcurrentModification.is_retryable());
        assert!(!PostingError::EmptyEntry.is_retryable());
        assert!(!PostingError::DuplicatePosting { key: "k".into() }.is_retryable());
    }

    #[test]
    fn test_error_display_carries_line_index() {
        let err = PostingError::NegativeAmount { line_index: 2 };
        assert_eq!(err.to_string(), "Line 2: amount cannot be negative");

        let err = PostingError::UnbalancedEntry {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Entry is not balanced. Debit: 100.00, Credit: 50.00"
        );
    }
}
