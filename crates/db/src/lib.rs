//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger schema
//! - Repository abstractions for data access
//! - Database migrations
//!
//! All multi-row writes go through a database transaction; the posting
//! repository is the engine's atomic commit boundary.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, DimensionRepository, JournalRepository, ReconciliationRepository,
    ReportRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
