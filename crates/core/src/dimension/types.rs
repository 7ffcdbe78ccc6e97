//! Dimension directory domain types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Tags on a journal line: dimension type ID -> dimension value ID.
///
/// A `BTreeMap` keeps tag iteration order stable, which keeps report and
/// matcher output deterministic.
pub type TagSet = BTreeMap<Uuid, Uuid>;

/// A dimension type (cost center, project, department, location, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionTypeRecord {
    /// The dimension type ID.
    pub id: Uuid,
    /// Unique code (e.g. "CC").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Whether values of this type may be used on new lines.
    pub is_active: bool,
    /// Sort order for display.
    pub sort_order: i16,
}

/// A value of a dimension type (e.g. cost center "CC-01").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionValueRecord {
    /// The dimension value ID.
    pub id: Uuid,
    /// The dimension type this value belongs to.
    pub dimension_type_id: Uuid,
    /// Unique code within the type (e.g. "CC-01").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Whether this value may be used on new lines.
    pub is_active: bool,
}

/// The slice of a dimension value the validator needs.
#[derive(Debug, Clone, Copy)]
pub struct DimensionValueInfo {
    /// The dimension type this value belongs to.
    pub dimension_type_id: Uuid,
    /// Whether the value is active.
    pub is_active: bool,
}
