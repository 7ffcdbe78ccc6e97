//! `SeaORM` Entity for the journal_entries table.
//!
//! Append-only once committed. Reversal links are plain optional
//! back-references, never a bidirectional object graph.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntrySource, EntryStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub entry_number: i64,
    pub posting_date: Date,
    pub description: String,
    pub source: EntrySource,
    pub currency: String,
    pub reference: Option<String>,
    #[sea_orm(unique)]
    pub idempotency_key: Option<String>,
    pub status: EntryStatus,
    /// The entry this one reverses, if it is a reversal.
    pub reversal_of: Option<Uuid>,
    /// The entry that reversed this one, if any.
    pub reversed_by: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
