//! Chart of accounts types and normal-balance rules.

pub mod types;

pub use types::{AccountKind, AccountRecord, NormalBalance};
