//! Shared types, errors, and configuration for Ledgra.
//!
//! This crate provides common types used across all other crates:
//! - Money and currency types with decimal precision
//! - Pagination types for list endpoints
//! - Caller identity and capability checks
//! - Application-wide error types
//! - Configuration management

pub mod caller;
pub mod config;
pub mod error;
pub mod types;

pub use caller::{CallerIdentity, CallerRole};
pub use config::{AppConfig, ReconciliationConfig};
pub use error::{AppError, AppResult};
