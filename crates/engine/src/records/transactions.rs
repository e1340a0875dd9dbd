//! Transactions, as far as fund scoping and member attribution need them.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub uid: i64,
    pub fund_id: i64,
    pub transaction_time: DateTime<Utc>,
    pub amount: i64,
    pub comment: String,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: i64,
    pub uid: i64,
    pub fund_id: i64,
    pub transaction_time: DateTime<Utc>,
    pub amount: i64,
    pub comment: String,
    pub deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Transaction {
    fn from(value: Model) -> Self {
        Self {
            id: value.transaction_id,
            uid: value.uid,
            fund_id: value.fund_id,
            transaction_time: value.transaction_time,
            amount: value.amount,
            comment: value.comment,
        }
    }
}
