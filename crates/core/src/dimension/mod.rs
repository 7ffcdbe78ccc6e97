//! Analytical dimension directory and tag validation.
//!
//! Dimensions (cost center, project, department, location, ...) are
//! reference data; journal lines carry tags that point at dimension values
//! by ID, never by copy.

pub mod error;
pub mod filter;
pub mod types;
pub mod validator;

pub use error::DimensionError;
pub use filter::DimensionFilter;
pub use types::{DimensionTypeRecord, DimensionValueInfo, DimensionValueRecord, TagSet};
pub use validator::validate_tags;
