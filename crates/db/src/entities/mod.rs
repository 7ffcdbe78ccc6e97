//! `SeaORM` entity definitions for the ledger schema.

pub mod account_balances;
pub mod account_required_dimensions;
pub mod accounts;
pub mod bank_account_dimensions;
pub mod bank_accounts;
pub mod bank_reconciliations;
pub mod bank_transactions;
pub mod dimension_types;
pub mod dimension_values;
pub mod entry_sequences;
pub mod journal_entries;
pub mod journal_line_dimensions;
pub mod journal_lines;
pub mod reconciliation_items;
pub mod sea_orm_active_enums;
