//! Journal repository: the posting engine's atomic commit boundary.
//!
//! A posting is one serializable database transaction: the entry number is
//! taken from the sequence row under `FOR UPDATE`, then the header, lines,
//! dimension tags, and materialized balance rows are written together. The
//! entry becomes visible as a single unit or not at all; a rolled-back
//! posting releases its number before anyone can observe it.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{
    account_balances, account_required_dimensions, accounts, dimension_values, entry_sequences,
    journal_entries, journal_line_dimensions, journal_lines,
    sea_orm_active_enums::EntryStatus as DbEntryStatus,
};
use ledgra_core::dimension::{DimensionValueInfo, TagSet};
use ledgra_core::ledger::{
    AccountView, EntryStatus, JournalEntryInput, PostedLineView, PostingError, PostingService,
    ReversalService,
};

/// Bounded retry count for serialization conflicts.
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// A committed entry with its lines and tags, as returned to callers.
#[derive(Debug, Clone)]
pub struct PostedEntry {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Lines in line-number order.
    pub lines: Vec<PostedLineModel>,
}

/// A committed line with its dimension tags.
#[derive(Debug, Clone)]
pub struct PostedLineModel {
    /// The line row.
    pub line: journal_lines::Model,
    /// Dimension tags: type ID -> value ID.
    pub tags: TagSet,
}

/// Filter options for listing entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Filter by status.
    pub status: Option<EntryStatus>,
    /// Filter by source.
    pub source: Option<ledgra_core::ledger::EntrySource>,
    /// Filter by posting date range start.
    pub date_from: Option<chrono::NaiveDate>,
    /// Filter by posting date range end.
    pub date_to: Option<chrono::NaiveDate>,
}

/// Journal repository for posting and reversal.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and commits a journal entry.
    ///
    /// Validation order: structural, balance, dimension legality (all in
    /// core, against batched directory snapshots), then the idempotency
    /// key at the commit boundary. A retried call with the same key
    /// returns the originally committed entry; reusing a key for a
    /// different payload is rejected as a duplicate posting.
    ///
    /// Serialization conflicts are retried up to [`MAX_COMMIT_ATTEMPTS`]
    /// times before surfacing as `ConcurrentModification`.
    ///
    /// # Errors
    ///
    /// Returns a `PostingError`; on any error the ledger is unchanged.
    pub async fn post_entry(&self, input: JournalEntryInput) -> Result<PostedEntry, PostingError> {
        let account_views = self.load_account_views(&input).await?;
        let dimension_infos = self.load_dimension_infos(&input).await?;

        PostingService::validate_entry(
            &input,
            |id| account_views.get(&id).cloned(),
            |id| dimension_infos.get(&id).copied(),
        )?;

        // Idempotency: a key that already committed returns the original.
        if let Some(key) = &input.idempotency_key {
            if let Some(existing) = self.find_by_idempotency_key(key).await? {
                verify_same_payload(&existing, &input, key)?;
                return self.load_posted(existing.id).await;
            }
        }

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            match self.try_commit(&input).await {
                Ok(entry) => return Ok(entry),
                Err(PostingError::ConcurrentModification) if attempt < MAX_COMMIT_ATTEMPTS => {
                    warn!(attempt, "posting hit a serialization conflict, retrying");
                }
                Err(PostingError::DuplicatePosting { key }) => {
                    // Lost an idempotency race mid-commit: the winner's
                    // entry is the result.
                    let existing = self
                        .find_by_idempotency_key(&key)
                        .await?
                        .ok_or(PostingError::DuplicatePosting { key: key.clone() })?;
                    verify_same_payload(&existing, &input, &key)?;
                    return self.load_posted(existing.id).await;
                }
                Err(e) => return Err(e),
            }
        }
        Err(PostingError::ConcurrentModification)
    }

    /// Reverses a posted entry: commits a mirror entry and flips the
    /// original's status, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `NotPosted`, or `AlreadyReversed` when the
    /// target does not qualify.
    pub async fn reverse_entry(
        &self,
        entry_id: Uuid,
        reversed_by_caller: Uuid,
    ) -> Result<PostedEntry, PostingError> {
        // Cheap pre-check outside the transaction for a friendly error.
        let entry = journal_entries::Entity::find_by_id(entry_id)
            .one(&self.db)
            .await
            .map_err(|e| map_commit_err(&e, None))?
            .ok_or(PostingError::EntryNotFound(entry_id))?;
        PostingService::validate_can_reverse(entry_id, entry.status.clone().into(), entry.reversed_by)?;

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            match self.try_reverse(entry_id, reversed_by_caller).await {
                Ok(entry) => return Ok(entry),
                Err(PostingError::ConcurrentModification) if attempt < MAX_COMMIT_ATTEMPTS => {
                    warn!(attempt, "reversal hit a serialization conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(PostingError::ConcurrentModification)
    }

    /// Gets one committed entry with its lines and tags.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist.
    pub async fn get_entry(&self, entry_id: Uuid) -> Result<PostedEntry, PostingError> {
        self.load_posted(entry_id).await
    }

    /// Lists entry headers with filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_entries(
        &self,
        filter: EntryFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<journal_entries::Model>, u64), PostingError> {
        let mut query = journal_entries::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(journal_entries::Column::Status.eq(DbEntryStatus::from(status)));
        }
        if let Some(source) = filter.source {
            query = query.filter(
                journal_entries::Column::Source
                    .eq(crate::entities::sea_orm_active_enums::EntrySource::from(source)),
            );
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(journal_entries::Column::PostingDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(journal_entries::Column::PostingDate.lte(date_to));
        }

        let paginator = query
            .order_by_desc(journal_entries::Column::EntryNumber)
            .paginate(&self.db, per_page.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(|e| map_commit_err(&e, None))?;
        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| map_commit_err(&e, None))?;

        Ok((models, total))
    }

    // ========================================================================
    // Commit internals
    // ========================================================================

    /// One commit attempt inside a serializable transaction.
    async fn try_commit(&self, input: &JournalEntryInput) -> Result<PostedEntry, PostingError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(|e| map_commit_err(&e, input.idempotency_key.as_deref()))?;

        let entry_number = next_entry_number(&txn)
            .await
            .map_err(|e| map_commit_err(&e, input.idempotency_key.as_deref()))?;

        let entry_id = Uuid::new_v4();
        let now = chrono::Utc::now().into();

        let entry = journal_entries::ActiveModel {
            id: Set(entry_id),
            entry_number: Set(entry_number),
            posting_date: Set(input.posting_date),
            description: Set(input.description.clone()),
            source: Set(input.source.into()),
            currency: Set(input.currency.to_string()),
            reference: Set(input.reference.clone()),
            idempotency_key: Set(input.idempotency_key.clone()),
            status: Set(DbEntryStatus::Posted),
            reversal_of: Set(None),
            reversed_by: Set(None),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let entry_model = entry
            .insert(&txn)
            .await
            .map_err(|e| map_commit_err(&e, input.idempotency_key.as_deref()))?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (line_no, line_input) in input.lines.iter().enumerate() {
            let line_id = Uuid::new_v4();
            let line = journal_lines::ActiveModel {
                id: Set(line_id),
                entry_id: Set(entry_id),
                line_no: Set(i16::try_from(line_no).unwrap_or(i16::MAX)),
                account_id: Set(line_input.account_id),
                debit: Set(line_input.debit),
                credit: Set(line_input.credit),
                memo: Set(line_input.memo.clone()),
                created_at: Set(now),
            };
            let line_model = line
                .insert(&txn)
                .await
                .map_err(|e| map_commit_err(&e, input.idempotency_key.as_deref()))?;

            for (&type_id, &value_id) in &line_input.tags {
                let tag = journal_line_dimensions::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    line_id: Set(line_id),
                    dimension_type_id: Set(type_id),
                    dimension_value_id: Set(value_id),
                };
                tag.insert(&txn)
                    .await
                    .map_err(|e| map_commit_err(&e, input.idempotency_key.as_deref()))?;
            }

            lines.push(PostedLineModel {
                line: line_model,
                tags: line_input.tags.clone(),
            });
        }

        apply_balance_deltas(&txn, &lines)
            .await
            .map_err(|e| map_commit_err(&e, input.idempotency_key.as_deref()))?;

        txn.commit()
            .await
            .map_err(|e| map_commit_err(&e, input.idempotency_key.as_deref()))?;

        Ok(PostedEntry {
            entry: entry_model,
            lines,
        })
    }

    /// One reversal attempt inside a serializable transaction.
    async fn try_reverse(
        &self,
        entry_id: Uuid,
        reversed_by_caller: Uuid,
    ) -> Result<PostedEntry, PostingError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(|e| map_commit_err(&e, None))?;

        // Re-check under lock so two concurrent reversals cannot both pass.
        let original = journal_entries::Entity::find_by_id(entry_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| map_commit_err(&e, None))?
            .ok_or(PostingError::EntryNotFound(entry_id))?;
        PostingService::validate_can_reverse(
            entry_id,
            original.status.clone().into(),
            original.reversed_by,
        )?;

        let original_lines = load_lines_with_tags(&txn, entry_id)
            .await
            .map_err(|e| map_commit_err(&e, None))?;
        let line_views: Vec<PostedLineView> = original_lines
            .iter()
            .map(|l| PostedLineView {
                account_id: l.line.account_id,
                debit: l.line.debit,
                credit: l.line.credit,
                currency: original
                    .currency
                    .parse()
                    .unwrap_or(ledgra_shared::types::Currency::Usd),
                memo: l.line.memo.clone(),
                tags: l.tags.clone(),
            })
            .collect();

        if !ReversalService::original_is_balanced(&line_views) {
            // A committed entry can never be unbalanced; treat as corruption.
            return Err(PostingError::StorageUnavailable(format!(
                "entry {entry_id} is unbalanced in storage"
            )));
        }

        let build = ReversalService::build(original.entry_number, &line_views);

        let entry_number = next_entry_number(&txn)
            .await
            .map_err(|e| map_commit_err(&e, None))?;
        let reversal_id = Uuid::new_v4();
        let now = chrono::Utc::now().into();

        let reversal = journal_entries::ActiveModel {
            id: Set(reversal_id),
            entry_number: Set(entry_number),
            posting_date: Set(original.posting_date),
            description: Set(build.description.clone()),
            source: Set(original.source.clone()),
            currency: Set(original.currency.clone()),
            reference: Set(original.reference.clone()),
            idempotency_key: Set(None),
            status: Set(DbEntryStatus::Posted),
            reversal_of: Set(Some(entry_id)),
            reversed_by: Set(None),
            created_by: Set(reversed_by_caller),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let reversal_model = reversal
            .insert(&txn)
            .await
            .map_err(|e| map_commit_err(&e, None))?;

        let mut lines = Vec::with_capacity(build.lines.len());
        for (line_no, line_input) in build.lines.iter().enumerate() {
            let line_id = Uuid::new_v4();
            let line = journal_lines::ActiveModel {
                id: Set(line_id),
                entry_id: Set(reversal_id),
                line_no: Set(i16::try_from(line_no).unwrap_or(i16::MAX)),
                account_id: Set(line_input.account_id),
                debit: Set(line_input.debit),
                credit: Set(line_input.credit),
                memo: Set(line_input.memo.clone()),
                created_at: Set(now),
            };
            let line_model = line
                .insert(&txn)
                .await
                .map_err(|e| map_commit_err(&e, None))?;

            for (&type_id, &value_id) in &line_input.tags {
                let tag = journal_line_dimensions::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    line_id: Set(line_id),
                    dimension_type_id: Set(type_id),
                    dimension_value_id: Set(value_id),
                };
                tag.insert(&txn)
                    .await
                    .map_err(|e| map_commit_err(&e, None))?;
            }

            lines.push(PostedLineModel {
                line: line_model,
                tags: line_input.tags.clone(),
            });
        }

        apply_balance_deltas(&txn, &lines)
            .await
            .map_err(|e| map_commit_err(&e, None))?;

        // Flip the original's status; its lines stay untouched.
        let mut original_active: journal_entries::ActiveModel = original.into();
        original_active.status = Set(DbEntryStatus::Reversed);
        original_active.reversed_by = Set(Some(reversal_id));
        original_active.updated_at = Set(now);
        original_active
            .update(&txn)
            .await
            .map_err(|e| map_commit_err(&e, None))?;

        txn.commit().await.map_err(|e| map_commit_err(&e, None))?;

        Ok(PostedEntry {
            entry: reversal_model,
            lines,
        })
    }

    // ========================================================================
    // Batched directory snapshots
    // ========================================================================

    /// Loads posting views for every account referenced by the input, in
    /// two queries.
    async fn load_account_views(
        &self,
        input: &JournalEntryInput,
    ) -> Result<HashMap<Uuid, AccountView>, PostingError> {
        let account_ids: Vec<Uuid> = input
            .lines
            .iter()
            .map(|l| l.account_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let models = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| map_commit_err(&e, None))?;

        let requirements = account_required_dimensions::Entity::find()
            .filter(account_required_dimensions::Column::AccountId.is_in(account_ids))
            .all(&self.db)
            .await
            .map_err(|e| map_commit_err(&e, None))?;

        let mut required: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in requirements {
            required
                .entry(row.account_id)
                .or_default()
                .push(row.dimension_type_id);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let view = AccountView {
                    id: m.id,
                    is_active: m.is_active,
                    required_dimensions: required.remove(&m.id).unwrap_or_default(),
                };
                (m.id, view)
            })
            .collect())
    }

    /// Loads dimension value info for every tag in the input, in one query.
    async fn load_dimension_infos(
        &self,
        input: &JournalEntryInput,
    ) -> Result<HashMap<Uuid, DimensionValueInfo>, PostingError> {
        let value_ids: Vec<Uuid> = input
            .lines
            .iter()
            .flat_map(|l| l.tags.values().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if value_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let models = dimension_values::Entity::find()
            .filter(dimension_values::Column::Id.is_in(value_ids))
            .all(&self.db)
            .await
            .map_err(|e| map_commit_err(&e, None))?;

        Ok(models
            .into_iter()
            .map(|m| {
                (
                    m.id,
                    DimensionValueInfo {
                        dimension_type_id: m.dimension_type_id,
                        is_active: m.is_active,
                    },
                )
            })
            .collect())
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<journal_entries::Model>, PostingError> {
        journal_entries::Entity::find()
            .filter(journal_entries::Column::IdempotencyKey.eq(key))
            .one(&self.db)
            .await
            .map_err(|e| map_commit_err(&e, None))
    }

    async fn load_posted(&self, entry_id: Uuid) -> Result<PostedEntry, PostingError> {
        let entry = journal_entries::Entity::find_by_id(entry_id)
            .one(&self.db)
            .await
            .map_err(|e| map_commit_err(&e, None))?
            .ok_or(PostingError::EntryNotFound(entry_id))?;

        let lines = load_lines_with_tags(&self.db, entry_id)
            .await
            .map_err(|e| map_commit_err(&e, None))?;

        Ok(PostedEntry { entry, lines })
    }
}

/// Bumps and returns the next entry number under `FOR UPDATE`.
async fn next_entry_number(txn: &DatabaseTransaction) -> Result<i64, DbErr> {
    let sequence = entry_sequences::Entity::find_by_id(1i16)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("entry sequence row missing".to_string()))?;

    let entry_number = sequence.next_number;
    let mut active: entry_sequences::ActiveModel = sequence.into();
    active.next_number = Set(entry_number + 1);
    active.update(txn).await?;

    Ok(entry_number)
}

/// Folds the entry's lines into the materialized per-account balances.
async fn apply_balance_deltas(
    txn: &DatabaseTransaction,
    lines: &[PostedLineModel],
) -> Result<(), DbErr> {
    let mut deltas: BTreeMap<Uuid, (Decimal, Decimal)> = BTreeMap::new();
    for l in lines {
        let delta = deltas.entry(l.line.account_id).or_default();
        delta.0 += l.line.debit;
        delta.1 += l.line.credit;
    }

    let now = chrono::Utc::now().into();
    for (account_id, (debit, credit)) in deltas {
        match account_balances::Entity::find_by_id(account_id).one(txn).await? {
            Some(existing) => {
                let (debit_total, credit_total) =
                    (existing.debit_total + debit, existing.credit_total + credit);
                let mut active: account_balances::ActiveModel = existing.into();
                active.debit_total = Set(debit_total);
                active.credit_total = Set(credit_total);
                active.updated_at = Set(now);
                active.update(txn).await?;
            }
            None => {
                let row = account_balances::ActiveModel {
                    account_id: Set(account_id),
                    debit_total: Set(debit),
                    credit_total: Set(credit),
                    updated_at: Set(now),
                };
                row.insert(txn).await?;
            }
        }
    }
    Ok(())
}

/// Loads an entry's lines with their tags: one query for lines, one for
/// tags.
async fn load_lines_with_tags<C: sea_orm::ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
) -> Result<Vec<PostedLineModel>, DbErr> {
    let line_models = journal_lines::Entity::find()
        .filter(journal_lines::Column::EntryId.eq(entry_id))
        .order_by_asc(journal_lines::Column::LineNo)
        .all(conn)
        .await?;

    let line_ids: Vec<Uuid> = line_models.iter().map(|l| l.id).collect();
    let tag_rows = journal_line_dimensions::Entity::find()
        .filter(journal_line_dimensions::Column::LineId.is_in(line_ids))
        .all(conn)
        .await?;

    let mut tags_by_line: HashMap<Uuid, TagSet> = HashMap::new();
    for tag in tag_rows {
        tags_by_line
            .entry(tag.line_id)
            .or_default()
            .insert(tag.dimension_type_id, tag.dimension_value_id);
    }

    Ok(line_models
        .into_iter()
        .map(|line| {
            let tags = tags_by_line.remove(&line.id).unwrap_or_default();
            PostedLineModel { line, tags }
        })
        .collect())
}

/// Rejects reuse of an idempotency key for a different payload.
fn verify_same_payload(
    existing: &journal_entries::Model,
    input: &JournalEntryInput,
    key: &str,
) -> Result<(), PostingError> {
    let same = existing.posting_date == input.posting_date
        && existing.description == input.description
        && existing.currency == input.currency.to_string();
    if same {
        Ok(())
    } else {
        Err(PostingError::DuplicatePosting {
            key: key.to_string(),
        })
    }
}

/// Maps storage errors onto the posting error taxonomy.
///
/// Serialization conflicts become `ConcurrentModification` (retryable); a
/// unique violation on the idempotency key becomes `DuplicatePosting`;
/// everything else is `StorageUnavailable`.
fn map_commit_err(err: &DbErr, idempotency_key: Option<&str>) -> PostingError {
    let message = err.to_string();
    if message.contains("could not serialize access")
        || message.contains("deadlock detected")
        || message.contains("40001")
    {
        return PostingError::ConcurrentModification;
    }
    if let Some(key) = idempotency_key {
        if message.contains("idempotency_key") {
            return PostingError::DuplicatePosting {
                key: key.to_string(),
            };
        }
    }
    PostingError::StorageUnavailable(message)
}
