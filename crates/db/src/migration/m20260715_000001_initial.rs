//! Initial database migration.
//!
//! Creates the ledger schema: enums, directory tables, journal tables,
//! materialized balances, the entry number sequence, and the banking/
//! reconciliation tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: DIRECTORIES (accounts, dimensions)
        // ============================================================
        db.execute_unprepared(DIMENSION_TYPES_SQL).await?;
        db.execute_unprepared(DIMENSION_VALUES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNT_REQUIRED_DIMENSIONS_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL
        // ============================================================
        db.execute_unprepared(ENTRY_SEQUENCES_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINE_DIMENSIONS_SQL).await?;
        db.execute_unprepared(ACCOUNT_BALANCES_SQL).await?;

        // ============================================================
        // PART 4: BANKING & RECONCILIATION
        // ============================================================
        db.execute_unprepared(BANK_ACCOUNTS_SQL).await?;
        db.execute_unprepared(BANK_ACCOUNT_DIMENSIONS_SQL).await?;
        db.execute_unprepared(BANK_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(BANK_RECONCILIATIONS_SQL).await?;
        db.execute_unprepared(RECONCILIATION_ITEMS_SQL).await?;

        // ============================================================
        // PART 5: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_ENTRY_SEQUENCE_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_kind AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

CREATE TYPE entry_status AS ENUM (
    'draft',
    'posted',
    'reversed'
);

CREATE TYPE entry_source AS ENUM (
    'manual',
    'sales',
    'purchase',
    'banking',
    'manufacturing'
);

CREATE TYPE bank_txn_status AS ENUM (
    'unmatched',
    'matched',
    'disputed'
);

CREATE TYPE match_kind AS ENUM (
    'exact',
    'fuzzy'
);
";

const DIMENSION_TYPES_SQL: &str = r"
CREATE TABLE dimension_types (
    id UUID PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    sort_order SMALLINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const DIMENSION_VALUES_SQL: &str = r"
CREATE TABLE dimension_values (
    id UUID PRIMARY KEY,
    dimension_type_id UUID NOT NULL REFERENCES dimension_types(id),
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (dimension_type_id, code)
);

CREATE INDEX idx_dimension_values_type ON dimension_values(dimension_type_id);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    kind account_kind NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNT_REQUIRED_DIMENSIONS_SQL: &str = r"
CREATE TABLE account_required_dimensions (
    account_id UUID NOT NULL REFERENCES accounts(id),
    dimension_type_id UUID NOT NULL REFERENCES dimension_types(id),
    PRIMARY KEY (account_id, dimension_type_id)
);
";

const ENTRY_SEQUENCES_SQL: &str = r"
CREATE TABLE entry_sequences (
    id SMALLINT PRIMARY KEY,
    next_number BIGINT NOT NULL
);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    entry_number BIGINT NOT NULL UNIQUE,
    posting_date DATE NOT NULL,
    description TEXT NOT NULL,
    source entry_source NOT NULL,
    currency CHAR(3) NOT NULL,
    reference TEXT,
    idempotency_key TEXT UNIQUE,
    status entry_status NOT NULL,
    reversal_of UUID REFERENCES journal_entries(id),
    reversed_by UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_journal_entries_posting_date ON journal_entries(posting_date);
CREATE INDEX idx_journal_entries_status ON journal_entries(status);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES journal_entries(id),
    line_no SMALLINT NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(18,2) NOT NULL DEFAULT 0,
    credit NUMERIC(18,2) NOT NULL DEFAULT 0,
    memo TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT journal_lines_non_negative CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT journal_lines_single_sided CHECK ((debit = 0) <> (credit = 0)),
    UNIQUE (entry_id, line_no)
);

CREATE INDEX idx_journal_lines_entry ON journal_lines(entry_id);
CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const JOURNAL_LINE_DIMENSIONS_SQL: &str = r"
CREATE TABLE journal_line_dimensions (
    id UUID PRIMARY KEY,
    line_id UUID NOT NULL REFERENCES journal_lines(id),
    dimension_type_id UUID NOT NULL REFERENCES dimension_types(id),
    dimension_value_id UUID NOT NULL REFERENCES dimension_values(id),
    UNIQUE (line_id, dimension_type_id)
);

CREATE INDEX idx_line_dimensions_line ON journal_line_dimensions(line_id);
CREATE INDEX idx_line_dimensions_value ON journal_line_dimensions(dimension_value_id);
";

const ACCOUNT_BALANCES_SQL: &str = r"
CREATE TABLE account_balances (
    account_id UUID PRIMARY KEY REFERENCES accounts(id),
    debit_total NUMERIC(18,2) NOT NULL DEFAULT 0,
    credit_total NUMERIC(18,2) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const BANK_ACCOUNTS_SQL: &str = r"
CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    gl_account_id UUID NOT NULL REFERENCES accounts(id),
    currency CHAR(3) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const BANK_ACCOUNT_DIMENSIONS_SQL: &str = r"
CREATE TABLE bank_account_dimensions (
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id),
    dimension_type_id UUID NOT NULL REFERENCES dimension_types(id),
    dimension_value_id UUID NOT NULL REFERENCES dimension_values(id),
    PRIMARY KEY (bank_account_id, dimension_type_id)
);
";

const BANK_TRANSACTIONS_SQL: &str = r"
CREATE TABLE bank_transactions (
    id UUID PRIMARY KEY,
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id),
    txn_date DATE NOT NULL,
    amount NUMERIC(18,2) NOT NULL,
    description TEXT NOT NULL,
    reference TEXT,
    status bank_txn_status NOT NULL DEFAULT 'unmatched',
    imported_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_bank_transactions_account_date
    ON bank_transactions(bank_account_id, txn_date);
CREATE INDEX idx_bank_transactions_status ON bank_transactions(status);
";

const BANK_RECONCILIATIONS_SQL: &str = r"
CREATE TABLE bank_reconciliations (
    id UUID PRIMARY KEY,
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id),
    statement_start DATE NOT NULL,
    statement_end DATE NOT NULL,
    opening_balance NUMERIC(18,2) NOT NULL,
    closing_balance NUMERIC(18,2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const RECONCILIATION_ITEMS_SQL: &str = r"
CREATE TABLE reconciliation_items (
    id UUID PRIMARY KEY,
    reconciliation_id UUID NOT NULL REFERENCES bank_reconciliations(id),
    bank_transaction_id UUID NOT NULL REFERENCES bank_transactions(id),
    journal_line_id UUID REFERENCES journal_lines(id),
    match_kind match_kind,
    confidence NUMERIC(5,4),
    matched BOOLEAN NOT NULL DEFAULT FALSE,
    dimension_mismatch BOOLEAN NOT NULL DEFAULT FALSE,
    ambiguous_candidates JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_reconciliation_items_rec ON reconciliation_items(reconciliation_id);
CREATE UNIQUE INDEX idx_reconciliation_items_matched_line
    ON reconciliation_items(journal_line_id) WHERE matched = TRUE;
";

const SEED_ENTRY_SEQUENCE_SQL: &str = r"
INSERT INTO entry_sequences (id, next_number) VALUES (1, 1);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS reconciliation_items;
DROP TABLE IF EXISTS bank_reconciliations;
DROP TABLE IF EXISTS bank_transactions;
DROP TABLE IF EXISTS bank_account_dimensions;
DROP TABLE IF EXISTS bank_accounts;
DROP TABLE IF EXISTS account_balances;
DROP TABLE IF EXISTS journal_line_dimensions;
DROP TABLE IF EXISTS journal_lines;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS entry_sequences;
DROP TABLE IF EXISTS account_required_dimensions;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS dimension_values;
DROP TABLE IF EXISTS dimension_types;
DROP TYPE IF EXISTS match_kind;
DROP TYPE IF EXISTS bank_txn_status;
DROP TYPE IF EXISTS entry_source;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS account_kind;
";
