//! `SeaORM` Entity for the journal_line_dimensions join table.
//!
//! One row per (line, dimension type): the line's tag for that type.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_line_dimensions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub line_id: Uuid,
    pub dimension_type_id: Uuid,
    pub dimension_value_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_lines::Entity",
        from = "Column::LineId",
        to = "super::journal_lines::Column::Id"
    )]
    JournalLines,
    #[sea_orm(
        belongs_to = "super::dimension_values::Entity",
        from = "Column::DimensionValueId",
        to = "super::dimension_values::Column::Id"
    )]
    DimensionValues,
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl Related<super::dimension_values::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DimensionValues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
