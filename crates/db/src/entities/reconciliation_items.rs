//! `SeaORM` Entity for the reconciliation_items table.
//!
//! The only mutable entity in the model: the matched flag flips as
//! matching proceeds, and fuzzy items flip on manual confirmation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MatchKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reconciliation_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reconciliation_id: Uuid,
    pub bank_transaction_id: Uuid,
    /// The paired ledger line; absent for unmatched and ambiguous items.
    pub journal_line_id: Option<Uuid>,
    pub match_kind: Option<MatchKind>,
    /// Confidence score in [0, 1]; absent when no pairing was made.
    pub confidence: Option<Decimal>,
    pub matched: bool,
    pub dimension_mismatch: bool,
    /// Tied exact candidates for human review, as a JSON array of line IDs.
    pub ambiguous_candidates: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_reconciliations::Entity",
        from = "Column::ReconciliationId",
        to = "super::bank_reconciliations::Column::Id"
    )]
    BankReconciliations,
    #[sea_orm(
        belongs_to = "super::bank_transactions::Entity",
        from = "Column::BankTransactionId",
        to = "super::bank_transactions::Column::Id"
    )]
    BankTransactions,
}

impl Related<super::bank_reconciliations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankReconciliations.def()
    }
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
