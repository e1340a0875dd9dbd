//! Pictures attached to transactions.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_pictures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub picture_id: i64,
    pub uid: i64,
    pub fund_id: i64,
    pub transaction_id: i64,
    pub deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
