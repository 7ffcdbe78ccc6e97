//! Repository abstractions for data access.
//!
//! Each repository owns the queries for one part of the schema. Multi-row
//! writes always run inside a database transaction, and report queries are
//! single grouped selects, never per-row lookups.

pub mod account;
pub mod dimension;
pub mod journal;
pub mod reconciliation;
pub mod report;

pub use account::AccountRepository;
pub use dimension::DimensionRepository;
pub use journal::JournalRepository;
pub use reconciliation::ReconciliationRepository;
pub use report::ReportRepository;
