//! Dimension validation errors.

use thiserror::Error;
use uuid::Uuid;

/// Errors from validating a line's dimension tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    /// Tag references a dimension value that does not exist.
    #[error("Unknown dimension value: {0}")]
    UnknownValue(Uuid),

    /// Tag references an inactive dimension value.
    #[error("Dimension value {0} is inactive")]
    InactiveValue(Uuid),

    /// Tag's value belongs to a different dimension type than the tag key.
    #[error("Dimension value {value_id} does not belong to type {tagged_type_id}")]
    TypeMismatch {
        /// The tagged value.
        value_id: Uuid,
        /// The type the tag claimed.
        tagged_type_id: Uuid,
    },

    /// A dimension type the account requires carries no tag.
    #[error("Required dimension type missing: {0}")]
    MissingRequiredType(Uuid),
}
