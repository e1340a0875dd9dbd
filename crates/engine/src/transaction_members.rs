//! Links between transactions and the fund members they are attributed to.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub member_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fund_members::Entity",
        from = "Column::MemberId",
        to = "super::fund_members::Column::MemberId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FundMembers,
}

impl Related<super::fund_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
