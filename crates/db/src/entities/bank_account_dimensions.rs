//! `SeaORM` Entity for the bank_account_dimensions join table.
//!
//! The dimension tags expected on ledger lines for this bank account; the
//! matcher compares matched lines against them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_account_dimensions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub bank_account_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub dimension_type_id: Uuid,
    pub dimension_value_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id"
    )]
    BankAccounts,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
