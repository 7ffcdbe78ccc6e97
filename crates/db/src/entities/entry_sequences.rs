//! `SeaORM` Entity for the entry_sequences table.
//!
//! A single row holds the next journal entry number. It is read under
//! `FOR UPDATE` inside the posting transaction, so numbers are strictly
//! increasing and a rolled-back posting releases its number unobserved.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "entry_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i16,
    pub next_number: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
