//! Reconciliation repository: statement import, matcher runs, and item
//! confirmation.
//!
//! The matcher itself is pure core logic; this repository assembles its
//! snapshot (unmatched transactions, unconsumed candidate lines, settings)
//! and applies its outcome in a single transaction. A cancelled run applies
//! nothing, and re-runs leave previously confirmed matches untouched.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Query as SubQuery};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{
    bank_account_dimensions, bank_accounts, bank_reconciliations, bank_transactions,
    journal_entries, journal_line_dimensions, journal_lines, reconciliation_items,
    sea_orm_active_enums::{BankTxnStatus as DbBankTxnStatus, EntryStatus as DbEntryStatus, MatchKind as DbMatchKind},
};
use ledgra_core::dimension::TagSet;
use ledgra_core::reconciliation::{
    BankTransactionRecord, LedgerCandidate, MatchOutcome, MatcherSettings, ReconciliationMatcher,
};
use ledgra_shared::config::ReconciliationConfig;

/// Error types for reconciliation operations.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    /// Bank account not found.
    #[error("Bank account not found: {0}")]
    BankAccountNotFound(Uuid),

    /// Invalid statement period.
    #[error("Invalid statement period: start {start} is after end {end}")]
    InvalidStatementPeriod {
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },

    /// Reconciliation not found.
    #[error("Reconciliation not found: {0}")]
    ReconciliationNotFound(Uuid),

    /// Reconciliation item not found.
    #[error("Reconciliation item not found: {0}")]
    ItemNotFound(Uuid),

    /// Item is not awaiting confirmation.
    #[error("Reconciliation item {0} is not awaiting confirmation")]
    NotConfirmable(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a bank account.
#[derive(Debug, Clone)]
pub struct CreateBankAccountInput {
    /// Unique bank account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// The GL account this bank account's money moves through.
    pub gl_account_id: Uuid,
    /// Account currency code.
    pub currency: String,
    /// Expected dimension tags on lines for this bank account.
    pub default_tags: TagSet,
}

/// One statement line to import.
#[derive(Debug, Clone)]
pub struct ImportTransactionInput {
    /// Statement date.
    pub date: NaiveDate,
    /// Signed amount: positive in, negative out.
    pub amount: Decimal,
    /// Statement description.
    pub description: String,
    /// Statement reference, if any.
    pub reference: Option<String>,
}

/// A reconciliation with its items.
#[derive(Debug, Clone)]
pub struct ReconciliationWithItems {
    /// The reconciliation header.
    pub reconciliation: bank_reconciliations::Model,
    /// Items, matched first, then ambiguous, then unmatched exceptions.
    pub items: Vec<reconciliation_items::Model>,
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a bank account with its expected dimension mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn create_bank_account(
        &self,
        input: CreateBankAccountInput,
    ) -> Result<bank_accounts::Model, ReconciliationError> {
        let txn = self.db.begin().await?;
        let bank_account_id = Uuid::new_v4();

        let account = bank_accounts::ActiveModel {
            id: Set(bank_account_id),
            code: Set(input.code),
            name: Set(input.name),
            gl_account_id: Set(input.gl_account_id),
            currency: Set(input.currency),
            created_at: Set(chrono::Utc::now().into()),
        };
        let model = account.insert(&txn).await?;

        for (&type_id, &value_id) in &input.default_tags {
            let mapping = bank_account_dimensions::ActiveModel {
                bank_account_id: Set(bank_account_id),
                dimension_type_id: Set(type_id),
                dimension_value_id: Set(value_id),
            };
            mapping.insert(&txn).await?;
        }

        txn.commit().await?;
        Ok(model)
    }

    /// Imports statement transactions for a bank account, atomically.
    ///
    /// # Errors
    ///
    /// Returns `BankAccountNotFound` if the bank account is unknown.
    pub async fn import_transactions(
        &self,
        bank_account_id: Uuid,
        inputs: Vec<ImportTransactionInput>,
    ) -> Result<Vec<bank_transactions::Model>, ReconciliationError> {
        self.load_bank_account(bank_account_id).await?;

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();
        let mut models = Vec::with_capacity(inputs.len());

        for input in inputs {
            let row = bank_transactions::ActiveModel {
                id: Set(Uuid::new_v4()),
                bank_account_id: Set(bank_account_id),
                txn_date: Set(input.date),
                amount: Set(input.amount),
                description: Set(input.description),
                reference: Set(input.reference),
                status: Set(DbBankTxnStatus::Unmatched),
                imported_at: Set(now),
            };
            models.push(row.insert(&txn).await?);
        }

        txn.commit().await?;
        Ok(models)
    }

    /// Runs the matcher over a statement period and applies the outcome in
    /// one transaction.
    ///
    /// Candidate lines are committed lines on the bank account's GL account
    /// within the period widened by the fuzzy window, minus lines already
    /// consumed by a confirmed match. Re-running an already reconciled
    /// period therefore changes nothing previously matched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatementPeriod` or `BankAccountNotFound` on bad
    /// input.
    pub async fn reconcile(
        &self,
        bank_account_id: Uuid,
        statement_start: NaiveDate,
        statement_end: NaiveDate,
        config: &ReconciliationConfig,
    ) -> Result<ReconciliationWithItems, ReconciliationError> {
        if statement_start > statement_end {
            return Err(ReconciliationError::InvalidStatementPeriod {
                start: statement_start,
                end: statement_end,
            });
        }

        let bank_account = self.load_bank_account(bank_account_id).await?;
        let expected_tags = self.load_expected_tags(bank_account_id).await?;
        let settings = MatcherSettings::from_config(config, expected_tags);

        // Snapshot: statement transactions in the period.
        let txn_models = bank_transactions::Entity::find()
            .filter(bank_transactions::Column::BankAccountId.eq(bank_account_id))
            .filter(bank_transactions::Column::TxnDate.gte(statement_start))
            .filter(bank_transactions::Column::TxnDate.lte(statement_end))
            .order_by_asc(bank_transactions::Column::TxnDate)
            .all(&self.db)
            .await?;
        let transactions: Vec<BankTransactionRecord> = txn_models
            .iter()
            .map(|t| BankTransactionRecord {
                id: t.id,
                bank_account_id: t.bank_account_id,
                date: t.txn_date,
                amount: t.amount,
                description: t.description.clone(),
                reference: t.reference.clone(),
                status: t.status.clone().into(),
            })
            .collect();

        // Snapshot: unconsumed candidate lines around the period.
        let candidates = self
            .load_candidates(
                bank_account.gl_account_id,
                statement_start - Duration::days(config.fuzzy_date_window_days),
                statement_end + Duration::days(config.fuzzy_date_window_days),
            )
            .await?;

        let outcome = ReconciliationMatcher::match_statement(&transactions, &candidates, &settings);

        // Statement balances from the imported transactions.
        let opening_balance = self
            .sum_transactions(bank_account_id, None, Some(statement_start))
            .await?;
        let period_total = self
            .sum_transactions(bank_account_id, Some(statement_start), Some(statement_end + Duration::days(1)))
            .await?;
        let closing_balance = opening_balance + period_total;

        // Apply atomically: header, items, and status flips together.
        let txn = self.db.begin().await?;
        let reconciliation = insert_outcome(
            &txn,
            bank_account_id,
            statement_start,
            statement_end,
            opening_balance,
            closing_balance,
            &outcome,
        )
        .await?;
        txn.commit().await?;

        self.get_reconciliation(reconciliation).await
    }

    /// Gets a reconciliation with its items.
    ///
    /// # Errors
    ///
    /// Returns `ReconciliationNotFound` if it does not exist.
    pub async fn get_reconciliation(
        &self,
        reconciliation_id: Uuid,
    ) -> Result<ReconciliationWithItems, ReconciliationError> {
        let reconciliation = bank_reconciliations::Entity::find_by_id(reconciliation_id)
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::ReconciliationNotFound(reconciliation_id))?;

        let items = reconciliation_items::Entity::find()
            .filter(reconciliation_items::Column::ReconciliationId.eq(reconciliation_id))
            .order_by_desc(reconciliation_items::Column::Matched)
            .order_by_asc(reconciliation_items::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(ReconciliationWithItems {
            reconciliation,
            items,
        })
    }

    /// Confirms a fuzzy match: flips the item's matched flag and the bank
    /// transaction's status, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotConfirmable` unless the item is an unconfirmed pairing.
    pub async fn confirm_item(&self, item_id: Uuid) -> Result<(), ReconciliationError> {
        let item = reconciliation_items::Entity::find_by_id(item_id)
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::ItemNotFound(item_id))?;

        if item.matched || item.journal_line_id.is_none() {
            return Err(ReconciliationError::NotConfirmable(item_id));
        }

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();
        let bank_transaction_id = item.bank_transaction_id;

        let mut active: reconciliation_items::ActiveModel = item.into();
        active.matched = Set(true);
        active.updated_at = Set(now);
        active.update(&txn).await?;

        if let Some(txn_model) = bank_transactions::Entity::find_by_id(bank_transaction_id)
            .one(&txn)
            .await?
        {
            let mut txn_active: bank_transactions::ActiveModel = txn_model.into();
            txn_active.status = Set(DbBankTxnStatus::Matched);
            txn_active.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn load_bank_account(
        &self,
        bank_account_id: Uuid,
    ) -> Result<bank_accounts::Model, ReconciliationError> {
        bank_accounts::Entity::find_by_id(bank_account_id)
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::BankAccountNotFound(bank_account_id))
    }

    async fn load_expected_tags(
        &self,
        bank_account_id: Uuid,
    ) -> Result<TagSet, ReconciliationError> {
        Ok(bank_account_dimensions::Entity::find()
            .filter(bank_account_dimensions::Column::BankAccountId.eq(bank_account_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.dimension_type_id, m.dimension_value_id))
            .collect())
    }

    /// Loads candidate lines: committed lines on the GL account in the
    /// widened window, minus lines already consumed by a confirmed match.
    /// One query for lines+entries, one for tags.
    async fn load_candidates(
        &self,
        gl_account_id: Uuid,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<LedgerCandidate>, ReconciliationError> {
        let consumed_lines = SubQuery::select()
            .column(reconciliation_items::Column::JournalLineId)
            .from(reconciliation_items::Entity)
            .and_where(reconciliation_items::Column::Matched.eq(true))
            .and_where(reconciliation_items::Column::JournalLineId.is_not_null())
            .to_owned();

        let rows: Vec<(journal_lines::Model, Option<journal_entries::Model>)> =
            journal_lines::Entity::find()
                .find_also_related(journal_entries::Entity)
                .filter(journal_lines::Column::AccountId.eq(gl_account_id))
                .filter(journal_entries::Column::Status.is_in([
                    DbEntryStatus::Posted,
                    DbEntryStatus::Reversed,
                ]))
                .filter(journal_entries::Column::PostingDate.gte(window_start))
                .filter(journal_entries::Column::PostingDate.lte(window_end))
                .filter(
                    Expr::col((journal_lines::Entity, journal_lines::Column::Id))
                        .not_in_subquery(consumed_lines),
                )
                .all(&self.db)
                .await?;

        let line_ids: Vec<Uuid> = rows.iter().map(|(l, _)| l.id).collect();
        let tag_rows = journal_line_dimensions::Entity::find()
            .filter(journal_line_dimensions::Column::LineId.is_in(line_ids))
            .all(&self.db)
            .await?;
        let mut tags_by_line: HashMap<Uuid, TagSet> = HashMap::new();
        for tag in tag_rows {
            tags_by_line
                .entry(tag.line_id)
                .or_default()
                .insert(tag.dimension_type_id, tag.dimension_value_id);
        }

        Ok(rows
            .into_iter()
            .filter_map(|(line, entry)| {
                let entry = entry?;
                Some(LedgerCandidate {
                    line_id: line.id,
                    entry_id: entry.id,
                    posting_date: entry.posting_date,
                    amount: line.debit - line.credit,
                    description: entry.description,
                    reference: entry.reference,
                    tags: tags_by_line.remove(&line.id).unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Sums transaction amounts in `[from, to)` for the statement balances.
    async fn sum_transactions(
        &self,
        bank_account_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Decimal, ReconciliationError> {
        let mut query = bank_transactions::Entity::find()
            .select_only()
            .column_as(bank_transactions::Column::Amount.sum(), "total")
            .filter(bank_transactions::Column::BankAccountId.eq(bank_account_id));
        if let Some(from) = from {
            query = query.filter(bank_transactions::Column::TxnDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(bank_transactions::Column::TxnDate.lt(to));
        }

        let total: Option<Option<Decimal>> = query.into_tuple().one(&self.db).await?;
        Ok(total.flatten().unwrap_or_default())
    }

}

/// Writes the reconciliation header, its items, and the bank transaction
/// status flips. Runs inside the caller's transaction.
#[allow(clippy::too_many_arguments)]
async fn insert_outcome(
    txn: &DatabaseTransaction,
    bank_account_id: Uuid,
    statement_start: NaiveDate,
    statement_end: NaiveDate,
    opening_balance: Decimal,
    closing_balance: Decimal,
    outcome: &MatchOutcome,
) -> Result<Uuid, ReconciliationError> {
    let reconciliation_id = Uuid::new_v4();
    let now = chrono::Utc::now().into();

    let header = bank_reconciliations::ActiveModel {
        id: Set(reconciliation_id),
        bank_account_id: Set(bank_account_id),
        statement_start: Set(statement_start),
        statement_end: Set(statement_end),
        opening_balance: Set(opening_balance),
        closing_balance: Set(closing_balance),
        created_at: Set(now),
    };
    header.insert(txn).await?;

    for item in &outcome.matched {
        let row = reconciliation_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            reconciliation_id: Set(reconciliation_id),
            bank_transaction_id: Set(item.transaction_id),
            journal_line_id: Set(Some(item.line_id)),
            match_kind: Set(Some(DbMatchKind::from(item.kind))),
            confidence: Set(Some(item.confidence)),
            matched: Set(item.auto_accepted),
            dimension_mismatch: Set(item.dimension_mismatch),
            ambiguous_candidates: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        row.insert(txn).await?;

        if item.auto_accepted {
            if let Some(model) =
                bank_transactions::Entity::find_by_id(item.transaction_id).one(txn).await?
            {
                let mut active: bank_transactions::ActiveModel = model.into();
                active.status = Set(DbBankTxnStatus::Matched);
                active.update(txn).await?;
            }
        }
    }

    for item in &outcome.ambiguous {
        let candidates = serde_json::to_value(&item.candidate_line_ids)
            .unwrap_or(serde_json::Value::Null);
        let row = reconciliation_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            reconciliation_id: Set(reconciliation_id),
            bank_transaction_id: Set(item.transaction_id),
            journal_line_id: Set(None),
            match_kind: Set(None),
            confidence: Set(None),
            matched: Set(false),
            dimension_mismatch: Set(false),
            ambiguous_candidates: Set(Some(candidates)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        row.insert(txn).await?;
    }

    for &transaction_id in &outcome.unmatched {
        let row = reconciliation_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            reconciliation_id: Set(reconciliation_id),
            bank_transaction_id: Set(transaction_id),
            journal_line_id: Set(None),
            match_kind: Set(None),
            confidence: Set(None),
            matched: Set(false),
            dimension_mismatch: Set(false),
            ambiguous_candidates: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        row.insert(txn).await?;
    }

    Ok(reconciliation_id)
}

