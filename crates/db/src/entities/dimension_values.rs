//! `SeaORM` Entity for the dimension_values table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "dimension_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub dimension_type_id: Uuid,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dimension_types::Entity",
        from = "Column::DimensionTypeId",
        to = "super::dimension_types::Column::Id"
    )]
    DimensionTypes,
}

impl Related<super::dimension_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DimensionTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
