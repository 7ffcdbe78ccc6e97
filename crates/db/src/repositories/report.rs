//! Report repository for ledger aggregation queries.
//!
//! Every report is a fixed, small number of grouped queries (one grouped
//! scan plus one directory load), never a per-row lookup loop. The live
//! mode scans `journal_lines`; the materialized mode reads
//! `account_balances`, which the posting transaction keeps in lockstep.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Query as SubQuery};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{
    account_balances, accounts, dimension_types, dimension_values, journal_entries,
    journal_line_dimensions, journal_lines,
    sea_orm_active_enums::EntryStatus as DbEntryStatus,
};
use ledgra_core::account::AccountKind;
use ledgra_core::ledger::{DimensionalSummaryRow, TrialBalance, TrialBalanceRow};
use ledgra_core::ledger::aggregation::UNTAGGED_CODE;
use ledgra_core::reports::{BalanceSheetReport, ProfitLossReport, ReportService};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Dimension type not found.
    #[error("Dimension type not found: {0}")]
    DimensionTypeNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Report repository for aggregation queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Trial balance
    // ========================================================================

    /// Live trial balance: one grouped scan of committed lines dated on or
    /// before `as_of`, optionally filtered to lines tagged with any of
    /// `dimension_values`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn trial_balance_live(
        &self,
        as_of: NaiveDate,
        dimension_value_filter: &[Uuid],
    ) -> Result<TrialBalance, ReportError> {
        let totals = self
            .grouped_account_totals(None, Some(as_of), dimension_value_filter)
            .await?;
        self.assemble_trial_balance(as_of, totals).await
    }

    /// Materialized trial balance: reads the running totals maintained by
    /// the posting transaction. Answers the current state; date-scoped or
    /// filtered queries use the live scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn trial_balance_materialized(
        &self,
        as_of: NaiveDate,
    ) -> Result<TrialBalance, ReportError> {
        let rows = account_balances::Entity::find().all(&self.db).await?;
        let totals: Vec<(Uuid, Decimal, Decimal)> = rows
            .into_iter()
            .map(|r| (r.account_id, r.debit_total, r.credit_total))
            .collect();
        self.assemble_trial_balance(as_of, totals).await
    }

    // ========================================================================
    // Dimensional summary
    // ========================================================================

    /// Summarizes committed lines in `[from, to]` by the values of one
    /// dimension type: one grouped query for tagged lines, one for the
    /// untagged bucket, one directory load for value codes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from > to`.
    pub async fn dimensional_summary(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        dimension_type_id: Uuid,
        include_untagged: bool,
    ) -> Result<Vec<DimensionalSummaryRow>, ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange {
                start: from,
                end: to,
            });
        }
        dimension_types::Entity::find_by_id(dimension_type_id)
            .one(&self.db)
            .await?
            .ok_or(ReportError::DimensionTypeNotFound(dimension_type_id))?;

        // Grouped totals per dimension value of the requested type.
        let tagged: Vec<(Uuid, Option<Decimal>, Option<Decimal>)> =
            journal_lines::Entity::find()
                .select_only()
                .column(journal_line_dimensions::Column::DimensionValueId)
                .column_as(journal_lines::Column::Debit.sum(), "debit_total")
                .column_as(journal_lines::Column::Credit.sum(), "credit_total")
                .join(JoinType::InnerJoin, journal_lines::Relation::JournalEntries.def())
                .join(JoinType::InnerJoin, journal_lines::Relation::LineDimensions.def())
                .filter(committed_status())
                .filter(journal_entries::Column::PostingDate.gte(from))
                .filter(journal_entries::Column::PostingDate.lte(to))
                .filter(journal_line_dimensions::Column::DimensionTypeId.eq(dimension_type_id))
                .group_by(journal_line_dimensions::Column::DimensionValueId)
                .into_tuple()
                .all(&self.db)
                .await?;

        // Resolve value codes in one directory load.
        let value_ids: Vec<Uuid> = tagged.iter().map(|t| t.0).collect();
        let values: HashMap<Uuid, (String, String)> = dimension_values::Entity::find()
            .filter(dimension_values::Column::Id.is_in(value_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|v| (v.id, (v.code, v.name)))
            .collect();

        let mut rows: Vec<DimensionalSummaryRow> = tagged
            .into_iter()
            .map(|(value_id, debit, credit)| {
                let (code, name) = values
                    .get(&value_id)
                    .cloned()
                    .unwrap_or_else(|| (value_id.to_string(), String::new()));
                DimensionalSummaryRow {
                    value_id: Some(value_id),
                    value_code: code,
                    value_name: name,
                    debit_total: debit.unwrap_or_default(),
                    credit_total: credit.unwrap_or_default(),
                }
            })
            .collect();
        rows.sort_by(|a, b| a.value_code.cmp(&b.value_code));

        if include_untagged {
            // Lines with no tag of this type, in one aggregate query.
            let untagged_subquery = SubQuery::select()
                .column(journal_line_dimensions::Column::LineId)
                .from(journal_line_dimensions::Entity)
                .and_where(
                    journal_line_dimensions::Column::DimensionTypeId.eq(dimension_type_id),
                )
                .to_owned();

            let untagged: Option<(Option<Decimal>, Option<Decimal>)> =
                journal_lines::Entity::find()
                    .select_only()
                    .column_as(journal_lines::Column::Debit.sum(), "debit_total")
                    .column_as(journal_lines::Column::Credit.sum(), "credit_total")
                    .join(JoinType::InnerJoin, journal_lines::Relation::JournalEntries.def())
                    .filter(committed_status())
                    .filter(journal_entries::Column::PostingDate.gte(from))
                    .filter(journal_entries::Column::PostingDate.lte(to))
                    .filter(
                        Expr::col((journal_lines::Entity, journal_lines::Column::Id))
                            .not_in_subquery(untagged_subquery),
                    )
                    .into_tuple()
                    .one(&self.db)
                    .await?;

            if let Some((Some(debit), Some(credit))) = untagged {
                rows.push(DimensionalSummaryRow {
                    value_id: None,
                    value_code: UNTAGGED_CODE.to_string(),
                    value_name: String::new(),
                    debit_total: debit,
                    credit_total: credit,
                });
            }
        }

        Ok(rows)
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Profit & loss over `[from, to]`, projected from a period-scoped
    /// grouped scan.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from > to`.
    pub async fn profit_loss(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ProfitLossReport, ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange {
                start: from,
                end: to,
            });
        }
        let totals = self.grouped_account_totals(Some(from), Some(to), &[]).await?;
        let balance = self.assemble_trial_balance(to, totals).await?;
        Ok(ReportService::profit_loss(balance.rows, from, to))
    }

    /// Balance sheet as of a date, projected from the live trial balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn balance_sheet(&self, as_of: NaiveDate) -> Result<BalanceSheetReport, ReportError> {
        let balance = self.trial_balance_live(as_of, &[]).await?;
        Ok(ReportService::balance_sheet(balance.rows, as_of))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// One grouped scan: per-account (debit, credit) totals over committed
    /// lines in the date scope, optionally restricted to lines tagged with
    /// any of `dimension_values` (via a subquery, so a line is counted
    /// once no matter how many filter values it carries).
    async fn grouped_account_totals(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        dimension_value_filter: &[Uuid],
    ) -> Result<Vec<(Uuid, Decimal, Decimal)>, ReportError> {
        let mut query = journal_lines::Entity::find()
            .select_only()
            .column(journal_lines::Column::AccountId)
            .column_as(journal_lines::Column::Debit.sum(), "debit_total")
            .column_as(journal_lines::Column::Credit.sum(), "credit_total")
            .join(JoinType::InnerJoin, journal_lines::Relation::JournalEntries.def())
            .filter(committed_status());

        if let Some(from) = from {
            query = query.filter(journal_entries::Column::PostingDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_entries::Column::PostingDate.lte(to));
        }
        if !dimension_value_filter.is_empty() {
            let tagged_lines = SubQuery::select()
                .column(journal_line_dimensions::Column::LineId)
                .from(journal_line_dimensions::Entity)
                .and_where(
                    journal_line_dimensions::Column::DimensionValueId
                        .is_in(dimension_value_filter.to_vec()),
                )
                .to_owned();
            query = query.filter(journal_lines::Column::Id.in_subquery(tagged_lines));
        }

        let totals: Vec<(Uuid, Option<Decimal>, Option<Decimal>)> = query
            .group_by(journal_lines::Column::AccountId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(totals
            .into_iter()
            .map(|(id, debit, credit)| (id, debit.unwrap_or_default(), credit.unwrap_or_default()))
            .collect())
    }

    /// Joins grouped totals with the account directory (one load) and
    /// assembles rows ordered by account code.
    async fn assemble_trial_balance(
        &self,
        as_of: NaiveDate,
        totals: Vec<(Uuid, Decimal, Decimal)>,
    ) -> Result<TrialBalance, ReportError> {
        let account_ids: Vec<Uuid> = totals.iter().map(|t| t.0).collect();
        let directory: HashMap<Uuid, accounts::Model> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut rows: Vec<TrialBalanceRow> = totals
            .into_iter()
            .map(|(account_id, debit_total, credit_total)| {
                let (code, name, kind) = directory.get(&account_id).map_or_else(
                    || (account_id.to_string(), String::new(), AccountKind::Asset),
                    |a| (a.code.clone(), a.name.clone(), a.kind.clone().into()),
                );
                TrialBalanceRow {
                    account_id,
                    code,
                    name,
                    kind,
                    debit_total,
                    credit_total,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code).then(a.account_id.cmp(&b.account_id)));

        let debit_total: Decimal = rows.iter().map(|r| r.debit_total).sum();
        let credit_total: Decimal = rows.iter().map(|r| r.credit_total).sum();

        Ok(TrialBalance {
            as_of,
            is_balanced: debit_total == credit_total,
            rows,
            debit_total,
            credit_total,
        })
    }
}

/// Filter: entries whose lines are part of the permanent ledger. Reversed
/// entries stay in scope; their reversal entries cancel them.
fn committed_status() -> sea_orm::sea_query::SimpleExpr {
    journal_entries::Column::Status.is_in([DbEntryStatus::Posted, DbEntryStatus::Reversed])
}
